use std::sync::Arc;

use ssz_derive::{Decode, Encode};
use ssz_types::BitVector;

use crate::{
    altair::containers::SyncCommittee,
    bellatrix::containers::ExecutionPayloadHeader,
    collections::{
        Balances, EpochParticipation, Eth1DataVotes, HistoricalRoots, InactivityScores,
        RandaoMixes, RecentRoots, Slashings, Validators,
    },
    phase0::{
        consts::JustificationBitsLength,
        containers::{BeaconBlockHeader, Checkpoint, Eth1Data, Fork},
        primitives::{DepositIndex, Slot, UnixSeconds, H256},
    },
    preset::Preset,
};

#[derive(Clone, PartialEq, Default, Debug, Encode, Decode)]
pub struct BeaconState<P: Preset> {
    // > Versioning
    pub genesis_time: UnixSeconds,
    pub genesis_validators_root: H256,
    pub slot: Slot,
    pub fork: Fork,

    // > History
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: RecentRoots<P>,
    pub state_roots: RecentRoots<P>,
    pub historical_roots: HistoricalRoots<P>,

    // > Eth1
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: Eth1DataVotes<P>,
    pub eth1_deposit_index: DepositIndex,

    // > Registry
    pub validators: Validators<P>,
    pub balances: Balances<P>,

    // > Randomness
    pub randao_mixes: RandaoMixes<P>,

    // > Slashings
    pub slashings: Slashings<P>,

    // > Participation
    pub previous_epoch_participation: EpochParticipation<P>,
    pub current_epoch_participation: EpochParticipation<P>,

    // > Finality
    pub justification_bits: BitVector<JustificationBitsLength>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // > Inactivity
    pub inactivity_scores: InactivityScores<P>,

    // > Sync
    pub current_sync_committee: Arc<SyncCommittee<P>>,
    pub next_sync_committee: Arc<SyncCommittee<P>>,

    // > Execution
    pub latest_execution_payload_header: ExecutionPayloadHeader,
}
