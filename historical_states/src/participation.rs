//! Reconstruction of the epoch participation bitfields.
//!
//! Participation is not archived; it is re-derived by replaying the
//! attestations of the two relevant epochs against the shuffled committees.
//! The partially built state acts as the authoritative slot-bearing object
//! during the replay and is finalized by the caller afterwards.

use anyhow::{bail, ensure, Result};
use bit_field::BitField as _;
use database::Database;
use ssz_types::{typenum::Unsigned as _, BitList};

use crate::{committees, error::Error, interrupt::Interrupt, misc, reader::HistoricalStatesReader};
use types::{
    altair::{
        consts::{TIMELY_HEAD_FLAG_INDEX, TIMELY_SOURCE_FLAG_INDEX, TIMELY_TARGET_FLAG_INDEX},
        primitives::ParticipationFlags,
    },
    collections::RandaoMixes,
    combined::BeaconState,
    nonstandard::{AttestationEpoch, Phase},
    phase0::{
        containers::AttestationData,
        primitives::{Epoch, Slot, ValidatorIndex, H256},
    },
    preset::Preset,
};

impl<P: Preset> HistoricalStatesReader<P> {
    /// Replays attestations from the start of the previous relevant epoch up
    /// to `slot`, producing the current and previous participation flag
    /// lists. `state` must already carry the history vectors, randao mixes
    /// and checkpoints of the target slot; its slot is borrowed during the
    /// replay and restored before returning.
    #[expect(clippy::too_many_arguments)]
    pub(crate) fn read_participation(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
        validators_length: u64,
        current_active: &[ValidatorIndex],
        previous_active: &[ValidatorIndex],
        state: &mut BeaconState<P>,
    ) -> Result<(Vec<ParticipationFlags>, Vec<ParticipationFlags>)> {
        let (epoch, previous_epoch) = self.compute_relevant_epochs(slot);
        let begin_slot = misc::compute_start_slot_at_epoch::<P>(previous_epoch);

        let mut current_flags = vec![0; usize::try_from(validators_length)?];
        let mut previous_flags = vec![0; usize::try_from(validators_length)?];

        // The mixes are copied out so the builder can stay mutable across
        // the replay.
        let randao_mixes = state.randao_mixes().clone();

        committees::try_cache_epochs_in_parallel::<P>(
            &self.shuffled_sets_cache,
            &randao_mixes,
            [current_active, previous_active],
            [epoch, previous_epoch],
        );

        for replay_slot in begin_slot..=slot {
            interrupt.check()?;

            let Some(block) = self
                .block_reader()
                .read_block_by_slot(interrupt, database, replay_slot)?
            else {
                continue;
            };

            // Flag derivation depends on the inclusion delay relative to the
            // slot being replayed.
            state.set_slot(replay_slot);
            let block_epoch = misc::compute_epoch_at_slot::<P>(replay_slot);

            for attestation in block.message.body.attestations.iter() {
                let data = attestation.data;
                let is_current_epoch = data.target.epoch == block_epoch;

                let active_indices = if is_current_epoch {
                    if block_epoch == previous_epoch {
                        previous_active
                    } else {
                        current_active
                    }
                } else if block_epoch == previous_epoch {
                    continue;
                } else {
                    previous_active
                };

                let attesting = self.attesting_indices(
                    &randao_mixes,
                    data,
                    &attestation.aggregation_bits,
                    active_indices,
                )?;

                let inclusion_delay = state.slot() - data.slot;
                let flags = attestation_participation_flags::<P>(state, data, inclusion_delay)?;

                let bitfields = if is_current_epoch && block_epoch != previous_epoch {
                    &mut current_flags
                } else {
                    &mut previous_flags
                };

                for validator_index in attesting {
                    let participation = bitfields
                        .get_mut(usize::try_from(validator_index)?)
                        .ok_or(Error::Internal("attesting index beyond the validator set"))?;

                    *participation |= flags;
                }
            }
        }

        state.set_slot(slot);

        Ok((current_flags, previous_flags))
    }

    /// The two epochs whose attestations can still affect participation.
    /// They collapse into one around the Altair transition of a pre-Altair
    /// chain, where no earlier participation exists to replay.
    pub(crate) fn compute_relevant_epochs(&self, slot: Slot) -> (Epoch, Epoch) {
        let epoch = misc::compute_epoch_at_slot::<P>(slot);

        if epoch <= self.config().altair_fork_epoch
            && self.genesis_state().phase() < Phase::Altair
        {
            return (epoch, epoch);
        }

        (epoch, epoch.saturating_sub(1))
    }

    /// Validators of the attestation's committee whose aggregation bit is
    /// set. The committee is sliced out of the cached shuffled set of the
    /// attestation's epoch.
    fn attesting_indices(
        &self,
        randao_mixes: &RandaoMixes<P>,
        data: AttestationData,
        aggregation_bits: &BitList<P::MaxValidatorsPerCommittee>,
        active_indices: &[ValidatorIndex],
    ) -> Result<Vec<ValidatorIndex>> {
        let attestation_epoch = misc::compute_epoch_at_slot::<P>(data.slot);

        let shuffled = self.shuffled_sets_cache.shuffled_active_set::<P>(
            randao_mixes,
            attestation_epoch,
            active_indices,
        )?;

        let committees_per_slot =
            misc::committee_count_from_active_validator_count::<P>(active_indices.len() as u64);

        let committee =
            committees::beacon_committee::<P>(&shuffled, data.slot, data.index, committees_per_slot)?;

        committees::attesting_indices::<P>(committee, aggregation_bits).map(Iterator::collect)
    }
}

/// Which duties the attestation performed in time, as a flag byte. Mirrors
/// `get_attestation_participation_flag_indices` in `consensus-specs`.
fn attestation_participation_flags<P: Preset>(
    state: &BeaconState<P>,
    data: AttestationData,
    inclusion_delay: u64,
) -> Result<ParticipationFlags> {
    let current_epoch = misc::compute_epoch_at_slot::<P>(state.slot());

    let attestation_epoch = match current_epoch.checked_sub(data.target.epoch) {
        Some(0) => AttestationEpoch::Current,
        Some(1) => AttestationEpoch::Previous,
        _ => bail!(Error::DecodeFailure {
            context: "attestation",
            details: format!(
                "target epoch {} out of range at slot {}",
                data.target.epoch,
                state.slot(),
            ),
        }),
    };

    let justified_checkpoint = match attestation_epoch {
        AttestationEpoch::Previous => state.previous_justified_checkpoint(),
        AttestationEpoch::Current => state.current_justified_checkpoint(),
    };

    let expected_target = block_root_of_epoch_start(state, data.target.epoch)?;
    let expected_head = block_root_at_slot(state, data.slot)?;

    // > Matching roots
    let is_matching_source = data.source == justified_checkpoint;
    let is_matching_target = is_matching_source && data.target.root == expected_target;
    let is_matching_head = is_matching_target && data.beacon_block_root == expected_head;

    ensure!(is_matching_source, Error::DecodeFailure {
        context: "attestation",
        details: format!("source does not match the justified checkpoint at slot {}", data.slot),
    });

    let slots_per_epoch = P::SLOTS_PER_EPOCH.get();
    let mut participation_flags = 0;

    if is_matching_source && inclusion_delay <= slots_per_epoch.isqrt() {
        participation_flags.set_bit(TIMELY_SOURCE_FLAG_INDEX, true);
    }

    if is_matching_target && inclusion_delay <= slots_per_epoch {
        participation_flags.set_bit(TIMELY_TARGET_FLAG_INDEX, true);
    }

    if is_matching_head && inclusion_delay <= P::MIN_ATTESTATION_INCLUSION_DELAY.get() {
        participation_flags.set_bit(TIMELY_HEAD_FLAG_INDEX, true);
    }

    Ok(participation_flags)
}

fn block_root_of_epoch_start<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> Result<H256> {
    block_root_at_slot(state, misc::compute_start_slot_at_epoch::<P>(epoch))
}

fn block_root_at_slot<P: Preset>(state: &BeaconState<P>, slot: Slot) -> Result<H256> {
    let size = P::SlotsPerHistoricalRoot::U64;

    ensure!(
        slot < state.slot() && state.slot() <= slot + size,
        Error::DecodeFailure {
            context: "attestation",
            details: format!("slot {slot} outside the recent history of slot {}", state.slot()),
        },
    );

    Ok(state.block_roots()[usize::try_from(slot % size)?])
}
