use std::sync::Arc;

use ssz_types::BitVector;

use crate::{
    altair::{beacon_state::BeaconState as AltairBeaconState, containers::SyncCommittee},
    bellatrix::{
        beacon_state::BeaconState as BellatrixBeaconState,
        containers::ExecutionPayloadHeader as BellatrixExecutionPayloadHeader,
    },
    capella::{
        beacon_state::BeaconState as CapellaBeaconState,
        containers::ExecutionPayloadHeader as CapellaExecutionPayloadHeader,
    },
    collections::{
        Attestations, Balances, EpochParticipation, Eth1DataVotes, HistoricalRoots,
        HistoricalSummaries, InactivityScores, RandaoMixes, RecentRoots, Slashings, Validators,
    },
    nonstandard::Phase,
    phase0::{
        beacon_state::BeaconState as Phase0BeaconState,
        consts::JustificationBitsLength,
        containers::{BeaconBlockHeader, Checkpoint, Eth1Data, Fork},
        primitives::{DepositIndex, Slot, UnixSeconds, ValidatorIndex, H256},
    },
    preset::Preset,
};

#[derive(Clone, PartialEq, Debug)]
pub enum ExecutionPayloadHeader {
    Bellatrix(BellatrixExecutionPayloadHeader),
    Capella(CapellaExecutionPayloadHeader),
}

impl ExecutionPayloadHeader {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Bellatrix(_) => Phase::Bellatrix,
            Self::Capella(_) => Phase::Capella,
        }
    }
}

/// A fully reconstructed state, tagged by the highest phase the requested
/// slot has reached. Constructed transiently per request.
#[derive(Clone, PartialEq, Debug)]
pub enum BeaconState<P: Preset> {
    Phase0(Phase0BeaconState<P>),
    Altair(AltairBeaconState<P>),
    Bellatrix(BellatrixBeaconState<P>),
    Capella(CapellaBeaconState<P>),
}

impl<P: Preset> From<Phase0BeaconState<P>> for BeaconState<P> {
    fn from(state: Phase0BeaconState<P>) -> Self {
        Self::Phase0(state)
    }
}

impl<P: Preset> From<AltairBeaconState<P>> for BeaconState<P> {
    fn from(state: AltairBeaconState<P>) -> Self {
        Self::Altair(state)
    }
}

impl<P: Preset> From<BellatrixBeaconState<P>> for BeaconState<P> {
    fn from(state: BellatrixBeaconState<P>) -> Self {
        Self::Bellatrix(state)
    }
}

impl<P: Preset> From<CapellaBeaconState<P>> for BeaconState<P> {
    fn from(state: CapellaBeaconState<P>) -> Self {
        Self::Capella(state)
    }
}

// The accessors below exist on every phase. Adding a phase extends the
// macro invocations; phase-gated fields get explicit matches further down.
macro_rules! copied_accessors {
    ($(pub fn $name:ident(&self) -> $return_type:ty;)+) => {
        $(
            #[must_use]
            pub fn $name(&self) -> $return_type {
                match self {
                    Self::Phase0(state) => state.$name,
                    Self::Altair(state) => state.$name,
                    Self::Bellatrix(state) => state.$name,
                    Self::Capella(state) => state.$name,
                }
            }
        )+
    };
}

macro_rules! borrowed_accessors {
    ($(pub fn $name:ident(&self) -> &$return_type:ty;)+) => {
        $(
            #[must_use]
            pub fn $name(&self) -> &$return_type {
                match self {
                    Self::Phase0(state) => &state.$name,
                    Self::Altair(state) => &state.$name,
                    Self::Bellatrix(state) => &state.$name,
                    Self::Capella(state) => &state.$name,
                }
            }
        )+
    };
}

impl<P: Preset> BeaconState<P> {
    copied_accessors! {
        pub fn genesis_time(&self) -> UnixSeconds;
        pub fn genesis_validators_root(&self) -> H256;
        pub fn slot(&self) -> Slot;
        pub fn fork(&self) -> Fork;
        pub fn latest_block_header(&self) -> BeaconBlockHeader;
        pub fn eth1_data(&self) -> Eth1Data;
        pub fn eth1_deposit_index(&self) -> DepositIndex;
        pub fn previous_justified_checkpoint(&self) -> Checkpoint;
        pub fn current_justified_checkpoint(&self) -> Checkpoint;
        pub fn finalized_checkpoint(&self) -> Checkpoint;
    }

    borrowed_accessors! {
        pub fn block_roots(&self) -> &RecentRoots<P>;
        pub fn state_roots(&self) -> &RecentRoots<P>;
        pub fn historical_roots(&self) -> &HistoricalRoots<P>;
        pub fn eth1_data_votes(&self) -> &Eth1DataVotes<P>;
        pub fn validators(&self) -> &Validators<P>;
        pub fn balances(&self) -> &Balances<P>;
        pub fn randao_mixes(&self) -> &RandaoMixes<P>;
        pub fn slashings(&self) -> &Slashings<P>;
        pub fn justification_bits(&self) -> &BitVector<JustificationBitsLength>;
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Phase0(_) => Phase::Phase0,
            Self::Altair(_) => Phase::Altair,
            Self::Bellatrix(_) => Phase::Bellatrix,
            Self::Capella(_) => Phase::Capella,
        }
    }

    pub fn set_slot(&mut self, slot: Slot) {
        match self {
            Self::Phase0(state) => state.slot = slot,
            Self::Altair(state) => state.slot = slot,
            Self::Bellatrix(state) => state.slot = slot,
            Self::Capella(state) => state.slot = slot,
        }
    }

    #[must_use]
    pub const fn current_epoch_attestations(&self) -> Option<&Attestations<P>> {
        match self {
            Self::Phase0(state) => Some(&state.current_epoch_attestations),
            _ => None,
        }
    }

    #[must_use]
    pub const fn previous_epoch_attestations(&self) -> Option<&Attestations<P>> {
        match self {
            Self::Phase0(state) => Some(&state.previous_epoch_attestations),
            _ => None,
        }
    }

    #[must_use]
    pub const fn current_epoch_participation(&self) -> Option<&EpochParticipation<P>> {
        match self {
            Self::Phase0(_) => None,
            Self::Altair(state) => Some(&state.current_epoch_participation),
            Self::Bellatrix(state) => Some(&state.current_epoch_participation),
            Self::Capella(state) => Some(&state.current_epoch_participation),
        }
    }

    #[must_use]
    pub const fn previous_epoch_participation(&self) -> Option<&EpochParticipation<P>> {
        match self {
            Self::Phase0(_) => None,
            Self::Altair(state) => Some(&state.previous_epoch_participation),
            Self::Bellatrix(state) => Some(&state.previous_epoch_participation),
            Self::Capella(state) => Some(&state.previous_epoch_participation),
        }
    }

    #[must_use]
    pub const fn inactivity_scores(&self) -> Option<&InactivityScores<P>> {
        match self {
            Self::Phase0(_) => None,
            Self::Altair(state) => Some(&state.inactivity_scores),
            Self::Bellatrix(state) => Some(&state.inactivity_scores),
            Self::Capella(state) => Some(&state.inactivity_scores),
        }
    }

    #[must_use]
    pub const fn current_sync_committee(&self) -> Option<&Arc<SyncCommittee<P>>> {
        match self {
            Self::Phase0(_) => None,
            Self::Altair(state) => Some(&state.current_sync_committee),
            Self::Bellatrix(state) => Some(&state.current_sync_committee),
            Self::Capella(state) => Some(&state.current_sync_committee),
        }
    }

    #[must_use]
    pub const fn next_sync_committee(&self) -> Option<&Arc<SyncCommittee<P>>> {
        match self {
            Self::Phase0(_) => None,
            Self::Altair(state) => Some(&state.next_sync_committee),
            Self::Bellatrix(state) => Some(&state.next_sync_committee),
            Self::Capella(state) => Some(&state.next_sync_committee),
        }
    }

    #[must_use]
    pub fn latest_execution_payload_header(&self) -> Option<ExecutionPayloadHeader> {
        match self {
            Self::Phase0(_) | Self::Altair(_) => None,
            Self::Bellatrix(state) => Some(ExecutionPayloadHeader::Bellatrix(
                state.latest_execution_payload_header.clone(),
            )),
            Self::Capella(state) => Some(ExecutionPayloadHeader::Capella(
                state.latest_execution_payload_header.clone(),
            )),
        }
    }

    #[must_use]
    pub const fn next_withdrawal_index(&self) -> Option<u64> {
        match self {
            Self::Capella(state) => Some(state.next_withdrawal_index),
            _ => None,
        }
    }

    #[must_use]
    pub const fn next_withdrawal_validator_index(&self) -> Option<ValidatorIndex> {
        match self {
            Self::Capella(state) => Some(state.next_withdrawal_validator_index),
            _ => None,
        }
    }

    #[must_use]
    pub const fn historical_summaries(&self) -> Option<&HistoricalSummaries<P>> {
        match self {
            Self::Capella(state) => Some(&state.historical_summaries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preset::Minimal;

    use super::*;

    #[test]
    fn phase_gated_fields_are_absent_before_their_fork() {
        let state = BeaconState::<Minimal>::Phase0(Phase0BeaconState::default());

        assert_eq!(state.phase(), Phase::Phase0);
        assert!(state.current_epoch_attestations().is_some());
        assert!(state.current_epoch_participation().is_none());
        assert!(state.latest_execution_payload_header().is_none());
        assert!(state.historical_summaries().is_none());
    }

    #[test]
    fn phase_gated_fields_appear_at_their_fork() {
        let state = BeaconState::<Minimal>::Capella(CapellaBeaconState::default());

        assert_eq!(state.phase(), Phase::Capella);
        assert!(state.current_epoch_attestations().is_none());
        assert!(state.current_epoch_participation().is_some());
        assert!(state.latest_execution_payload_header().is_some());
        assert!(state.historical_summaries().is_some());
    }
}
