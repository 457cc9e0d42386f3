//! The orchestrator: assembles a complete historical state for a slot.

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, ensure, Result};
use database::Database;
use log::{debug, warn};
use parking_lot::RwLock;
use ssz::Decode as _;
use ssz_types::typenum::Unsigned as _;

use crate::{
    accessors,
    base_encoding::{apply_uint64_list_diff, decode_slot_key, encode_slot_key, SLOT_KEY_LENGTH},
    buckets,
    committees::ShuffledSetsCache,
    error::Error,
    interrupt::Interrupt,
    misc,
    snapshots::{DumpSuffix, SnapshotStore},
    state_summary::{read_state_summary, StateSummary},
    validator_table::StaticValidatorTable,
};
use types::{
    altair::{beacon_state::BeaconState as AltairBeaconState, containers::SyncCommittee},
    bellatrix::beacon_state::BeaconState as BellatrixBeaconState,
    capella::beacon_state::BeaconState as CapellaBeaconState,
    collections::{Attestations, EpochParticipation, InactivityScores, RecentRoots},
    combined::{BeaconState, ExecutionPayloadHeader},
    config::Config,
    nonstandard::Phase,
    phase0::{
        beacon_state::BeaconState as Phase0BeaconState,
        containers::{Eth1Data, SignedBeaconBlock, Validator},
        primitives::{Slot, ValidatorIndex, H256},
    },
    preset::Preset,
};

/// Source of blocks for headers and attestation replay. Blocks are stored
/// blinded, so bodies surface the execution payload header directly.
pub trait BlockReader<P: Preset>: Send + Sync {
    fn read_block_by_slot(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
    ) -> Result<Option<Arc<SignedBeaconBlock<P>>>>;
}

/// Reconstructs full historical states from snapshots, diffs, the per-slot
/// summaries and the static validator table, without re-executing the chain.
pub struct HistoricalStatesReader<P: Preset> {
    config: Arc<Config>,
    snapshots: SnapshotStore,
    block_reader: Arc<dyn BlockReader<P>>,
    // Keeping the registry attributes hot in memory saves most of the I/O of
    // a reconstruction.
    validator_table: Arc<RwLock<StaticValidatorTable>>,
    genesis_state: Arc<BeaconState<P>>,
    pub(crate) shuffled_sets_cache: Arc<ShuffledSetsCache>,
}

impl<P: Preset> HistoricalStatesReader<P> {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        snapshots_directory: impl Into<PathBuf>,
        block_reader: Arc<dyn BlockReader<P>>,
        validator_table: Arc<RwLock<StaticValidatorTable>>,
        genesis_state: Arc<BeaconState<P>>,
        shuffled_sets_cache: Arc<ShuffledSetsCache>,
    ) -> Self {
        let snapshots = SnapshotStore::new(snapshots_directory, config.slots_per_dump);

        Self {
            config,
            snapshots,
            block_reader,
            validator_table,
            genesis_state,
            shuffled_sets_cache,
        }
    }

    #[must_use]
    pub const fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub(crate) fn genesis_state(&self) -> &BeaconState<P> {
        &self.genesis_state
    }

    pub(crate) fn block_reader(&self) -> &dyn BlockReader<P> {
        self.block_reader.as_ref()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Materializes the state as it was at the end of processing the block
    /// at `slot`. Returns `Ok(None)` when the slot was never ingested.
    pub fn read_historical_state(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
    ) -> Result<Option<BeaconState<P>>> {
        interrupt.check()?;

        let latest = accessors::state_processing_progress(database)?.unwrap_or_default();
        let frontier = latest.min(self.validator_table.read().slot());

        ensure!(slot <= frontier, Error::SlotAhead {
            slot,
            latest: frontier,
        });

        if slot == 0 {
            return Ok(Some(self.genesis_state.as_ref().clone()));
        }

        // The header of the block at the target slot becomes
        // `latest_block_header`, with the state root cleared the way block
        // processing leaves it.
        let Some(block) = self.block_reader.read_block_by_slot(interrupt, database, slot)? else {
            bail!(Error::BlockMissing { slot });
        };

        let Some(summary) = read_state_summary(database, slot)? else {
            debug!("state at slot {slot} was never ingested");
            return Ok(None);
        };

        let phase = summary.phase()?;
        let epoch = misc::compute_epoch_at_slot::<P>(slot);
        let rounded_slot = misc::round_slot_to_epoch::<P>(slot);

        let mut latest_block_header = block.to_header();
        latest_block_header.state_root = H256::ZERO;

        // History
        let block_roots = self.read_history_vector(
            interrupt,
            database,
            self.genesis_state.block_roots(),
            slot,
            buckets::BLOCK_ROOT,
        )?;

        let state_roots = self.read_history_vector(
            interrupt,
            database,
            self.genesis_state.state_roots(),
            slot,
            buckets::STATE_ROOT,
        )?;

        let historical_roots =
            accessors::read_historical_roots(database, summary.historical_roots_length)?;

        // Eth1
        let eth1_data_votes =
            self.read_eth1_data_votes(interrupt, database, slot, summary.eth1_data_votes_length)?;

        // Registry
        let balances = self
            .reconstruct_balances(interrupt, database, slot)?
            .chunks_exact(size_of::<u64>())
            .map(|chunk| u64::from_le_bytes(chunk.try_into().expect("chunks are 8 bytes")))
            .collect::<Vec<_>>();

        let (validators, current_active, previous_active) = self
            .read_validators_for_historical_state(
                interrupt,
                database,
                slot,
                summary.validators_length,
            )?;

        // Randomness
        let randao_mixes = self.read_randao_mixes(interrupt, database, slot)?;

        // Slashings
        let slashings = self.reconstruct_uint64_list_dump(
            interrupt,
            database,
            slot,
            buckets::VALIDATOR_SLASHINGS,
            P::EpochsPerSlashingsVector::USIZE,
        )?;

        // Finality
        let (previous_justified_checkpoint, current_justified_checkpoint, finalized_checkpoint) =
            match accessors::read_checkpoints(database, rounded_slot)? {
                Some(checkpoints) => (
                    checkpoints.previous_justified,
                    checkpoints.current_justified,
                    checkpoints.finalized,
                ),
                None => {
                    warn!("no finality checkpoints at slot {rounded_slot}, using genesis values");
                    (
                        self.genesis_state.previous_justified_checkpoint(),
                        self.genesis_state.current_justified_checkpoint(),
                        self.genesis_state.finalized_checkpoint(),
                    )
                }
            };

        let altair_fields = (phase >= Phase::Altair)
            .then(|| self.read_altair_fields(interrupt, database, slot, &summary))
            .transpose()?;

        let execution_payload_header = (phase >= Phase::Bellatrix)
            .then(|| {
                block
                    .message
                    .body
                    .execution_payload_header
                    .clone()
                    .ok_or(Error::DecodeFailure {
                        context: "block body",
                        details: "post-bellatrix block carries no execution payload header".into(),
                    })
            })
            .transpose()?;

        let historical_summaries = (phase >= Phase::Capella)
            .then(|| {
                accessors::read_historical_summaries(database, summary.historical_summaries_length)
            })
            .transpose()?;

        let genesis_time = self.genesis_state.genesis_time();
        let genesis_validators_root = self.genesis_state.genesis_validators_root();

        let block_roots = into_vector::<_, P::SlotsPerHistoricalRoot>(block_roots)?;
        let state_roots = into_vector::<_, P::SlotsPerHistoricalRoot>(state_roots)?;
        let randao_mixes = into_vector::<_, P::EpochsPerHistoricalVector>(randao_mixes)?;
        let slashings = into_vector::<_, P::EpochsPerSlashingsVector>(slashings)?;
        let historical_roots = into_list::<_, P::HistoricalRootsLimit>(historical_roots)?;
        let eth1_data_votes = into_list::<_, P::Eth1DataVotesLimit>(eth1_data_votes)?;
        let validators = into_list::<_, P::ValidatorRegistryLimit>(validators)?;
        let balances = into_list::<_, P::ValidatorRegistryLimit>(balances)?;

        let mut state: BeaconState<P> = match phase {
            Phase::Phase0 => {
                let (current_epoch_attestations, previous_epoch_attestations) = self
                    .read_pending_epochs(
                        database,
                        slot,
                        summary.current_epoch_attestations_length,
                        summary.previous_epoch_attestations_length,
                    )?;

                Phase0BeaconState {
                    genesis_time,
                    genesis_validators_root,
                    slot,
                    fork: summary.fork,
                    latest_block_header,
                    block_roots,
                    state_roots,
                    historical_roots,
                    eth1_data: summary.eth1_data,
                    eth1_data_votes,
                    eth1_deposit_index: summary.eth1_deposit_index,
                    validators,
                    balances,
                    randao_mixes,
                    slashings,
                    previous_epoch_attestations,
                    current_epoch_attestations,
                    justification_bits: summary.justification_bits.clone(),
                    previous_justified_checkpoint,
                    current_justified_checkpoint,
                    finalized_checkpoint,
                }
                .into()
            }
            Phase::Altair => {
                let altair = altair_fields.expect("altair fields are read for post-altair phases");

                AltairBeaconState {
                    genesis_time,
                    genesis_validators_root,
                    slot,
                    fork: summary.fork,
                    latest_block_header,
                    block_roots,
                    state_roots,
                    historical_roots,
                    eth1_data: summary.eth1_data,
                    eth1_data_votes,
                    eth1_deposit_index: summary.eth1_deposit_index,
                    validators,
                    balances,
                    randao_mixes,
                    slashings,
                    previous_epoch_participation: EpochParticipation::default(),
                    current_epoch_participation: EpochParticipation::default(),
                    justification_bits: summary.justification_bits.clone(),
                    previous_justified_checkpoint,
                    current_justified_checkpoint,
                    finalized_checkpoint,
                    inactivity_scores: altair.inactivity_scores,
                    current_sync_committee: altair.current_sync_committee,
                    next_sync_committee: altair.next_sync_committee,
                }
                .into()
            }
            Phase::Bellatrix => {
                let altair = altair_fields.expect("altair fields are read for post-altair phases");

                let Some(ExecutionPayloadHeader::Bellatrix(latest_execution_payload_header)) =
                    execution_payload_header
                else {
                    bail!(Error::DecodeFailure {
                        context: "block body",
                        details: "bellatrix state requires a bellatrix payload header".into(),
                    });
                };

                BellatrixBeaconState {
                    genesis_time,
                    genesis_validators_root,
                    slot,
                    fork: summary.fork,
                    latest_block_header,
                    block_roots,
                    state_roots,
                    historical_roots,
                    eth1_data: summary.eth1_data,
                    eth1_data_votes,
                    eth1_deposit_index: summary.eth1_deposit_index,
                    validators,
                    balances,
                    randao_mixes,
                    slashings,
                    previous_epoch_participation: EpochParticipation::default(),
                    current_epoch_participation: EpochParticipation::default(),
                    justification_bits: summary.justification_bits.clone(),
                    previous_justified_checkpoint,
                    current_justified_checkpoint,
                    finalized_checkpoint,
                    inactivity_scores: altair.inactivity_scores,
                    current_sync_committee: altair.current_sync_committee,
                    next_sync_committee: altair.next_sync_committee,
                    latest_execution_payload_header,
                }
                .into()
            }
            Phase::Capella => {
                let altair = altair_fields.expect("altair fields are read for post-altair phases");

                let Some(ExecutionPayloadHeader::Capella(latest_execution_payload_header)) =
                    execution_payload_header
                else {
                    bail!(Error::DecodeFailure {
                        context: "block body",
                        details: "capella state requires a capella payload header".into(),
                    });
                };

                let historical_summaries = historical_summaries
                    .expect("historical summaries are read for post-capella phases");

                CapellaBeaconState {
                    genesis_time,
                    genesis_validators_root,
                    slot,
                    fork: summary.fork,
                    latest_block_header,
                    block_roots,
                    state_roots,
                    historical_roots,
                    eth1_data: summary.eth1_data,
                    eth1_data_votes,
                    eth1_deposit_index: summary.eth1_deposit_index,
                    validators,
                    balances,
                    randao_mixes,
                    slashings,
                    previous_epoch_participation: EpochParticipation::default(),
                    current_epoch_participation: EpochParticipation::default(),
                    justification_bits: summary.justification_bits.clone(),
                    previous_justified_checkpoint,
                    current_justified_checkpoint,
                    finalized_checkpoint,
                    inactivity_scores: altair.inactivity_scores,
                    current_sync_committee: altair.current_sync_committee,
                    next_sync_committee: altair.next_sync_committee,
                    latest_execution_payload_header,
                    next_withdrawal_index: summary.next_withdrawal_index,
                    next_withdrawal_validator_index: summary.next_withdrawal_validator_index,
                    historical_summaries: into_list::<_, P::HistoricalRootsLimit>(
                        historical_summaries,
                    )?,
                }
                .into()
            }
        };

        if phase >= Phase::Altair {
            let (current, previous) = self.read_participation(
                interrupt,
                database,
                slot,
                summary.validators_length,
                &current_active,
                &previous_active,
                &mut state,
            )?;

            let current = into_list::<_, P::ValidatorRegistryLimit>(current)?;
            let previous = into_list::<_, P::ValidatorRegistryLimit>(previous)?;

            match &mut state {
                BeaconState::Phase0(_) => {
                    bail!(Error::Internal("participation replay ran for a phase0 state"))
                }
                BeaconState::Altair(state) => {
                    state.current_epoch_participation = current;
                    state.previous_epoch_participation = previous;
                }
                BeaconState::Bellatrix(state) => {
                    state.current_epoch_participation = current;
                    state.previous_epoch_participation = previous;
                }
                BeaconState::Capella(state) => {
                    state.current_epoch_participation = current;
                    state.previous_epoch_participation = previous;
                }
            }
        }

        debug!("reconstructed {phase} state at slot {slot} (epoch {epoch})");

        Ok(Some(state))
    }

    /// The fields Altair introduced: inactivity scores from their per-epoch
    /// dumps, and the sync committees of the period the slot falls in, with
    /// the genesis committees standing in for unrecorded periods.
    fn read_altair_fields(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
        summary: &StateSummary,
    ) -> Result<AltairFields<P>> {
        let inactivity = self.reconstruct_uint64_list_dump(
            interrupt,
            database,
            slot,
            buckets::INACTIVITY_SCORES,
            usize::try_from(summary.validators_length)?,
        )?;

        let period_slot = misc::round_slot_to_sync_committee_period::<P>(slot);

        let current_sync_committee =
            match accessors::read_current_sync_committee::<P>(database, period_slot)? {
                Some(committee) => Arc::new(committee),
                None => {
                    warn!("no current sync committee at slot {period_slot}, using genesis");
                    self.genesis_state
                        .current_sync_committee()
                        .cloned()
                        .ok_or(Error::Internal("no sync committee recorded for the period"))?
                }
            };

        let next_sync_committee =
            match accessors::read_next_sync_committee::<P>(database, period_slot)? {
                Some(committee) => Arc::new(committee),
                None => {
                    warn!("no next sync committee at slot {period_slot}, using genesis");
                    self.genesis_state
                        .next_sync_committee()
                        .cloned()
                        .ok_or(Error::Internal("no sync committee recorded for the period"))?
                }
            };

        Ok(AltairFields {
            inactivity_scores: into_list::<_, P::ValidatorRegistryLimit>(inactivity)?,
            current_sync_committee,
            next_sync_committee,
        })
    }

    /// Reads a ring-buffer history vector, blending database entries with the
    /// genesis vector for positions older than the chain itself.
    fn read_history_vector(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        genesis_vector: &RecentRoots<P>,
        slot: Slot,
        bucket: &'static str,
    ) -> Result<Vec<H256>> {
        interrupt.check()?;

        let size = P::SlotsPerHistoricalRoot::U64;
        let genesis_slot = self.genesis_state.slot();

        let need_from_genesis = match slot.checked_sub(size) {
            Some(oldest) if oldest > genesis_slot => 0,
            _ => size - (slot - genesis_slot),
        };

        let need_from_db = size - need_from_genesis;

        let mut out = vec![H256::ZERO; usize::try_from(size)?];
        let mut current_key_slot = 0;
        let mut inserted = 0;

        for pair in database.iterator_ascending(bucket, encode_slot_key(slot - need_from_db))? {
            if inserted >= need_from_db {
                break;
            }

            interrupt.check()?;

            let (key, value) = pair?;

            ensure!(value.len() == H256::len_bytes(), Error::DecodeFailure {
                context: "history vector entry",
                details: format!("expected 32 bytes, got {}", value.len()),
            });

            current_key_slot = decode_slot_key(&key)?;
            out[usize::try_from(current_key_slot % size)?] = H256::from_slice(&value);
            inserted += 1;
        }

        for _ in 0..need_from_genesis {
            current_key_slot += 1;
            let position = usize::try_from(current_key_slot % size)?;
            out[position] = genesis_vector[position];
        }

        Ok(out)
    }

    /// Randao mixes are keyed per epoch rather than per slot, and the mix of
    /// the current epoch is overwritten with the intra-epoch value recorded
    /// after the most recent block's reveal.
    fn read_randao_mixes(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
    ) -> Result<Vec<H256>> {
        interrupt.check()?;

        let size = P::EpochsPerHistoricalVector::U64;
        let slots_per_epoch = P::SLOTS_PER_EPOCH.get();
        let genesis_vector = self.genesis_state.randao_mixes();

        let rounded_slot = misc::round_slot_to_epoch::<P>(slot);
        let epoch = misc::compute_epoch_at_slot::<P>(slot);
        let genesis_epoch = misc::compute_epoch_at_slot::<P>(self.genesis_state.slot());

        let need_from_genesis = match epoch.checked_sub(size) {
            Some(oldest) if oldest > genesis_epoch => 0,
            _ => size - (epoch - genesis_epoch),
        };

        let need_from_db = size - need_from_genesis;

        let mut out = vec![H256::ZERO; usize::try_from(size)?];
        let mut current_key_epoch = 0;
        let mut inserted = 0;

        let start = encode_slot_key(rounded_slot - need_from_db * slots_per_epoch);

        for pair in database.iterator_ascending(buckets::RANDAO_MIXES, start)? {
            if inserted >= need_from_db {
                break;
            }

            interrupt.check()?;

            let (key, value) = pair?;

            ensure!(value.len() == H256::len_bytes(), Error::DecodeFailure {
                context: "randao mix",
                details: format!("expected 32 bytes, got {}", value.len()),
            });

            current_key_epoch = decode_slot_key(&key)? / slots_per_epoch;
            out[usize::try_from(current_key_epoch % size)?] = H256::from_slice(&value);
            inserted += 1;
        }

        for _ in 0..need_from_genesis {
            current_key_epoch += 1;
            let position = usize::try_from(current_key_epoch % size)?;
            out[position] = genesis_vector[position];
        }

        let intra_mix = database
            .get(buckets::INTRA_RANDAO_MIXES, encode_slot_key(slot))?
            .ok_or(Error::DecodeFailure {
                context: "intra-epoch randao mix",
                details: format!("no value at slot {slot}"),
            })?;

        ensure!(intra_mix.len() == H256::len_bytes(), Error::DecodeFailure {
            context: "intra-epoch randao mix",
            details: format!("expected 32 bytes, got {}", intra_mix.len()),
        });

        out[usize::try_from(epoch % size)?] = H256::from_slice(&intra_mix);

        Ok(out)
    }

    /// Rebuilds a uint64 list by loading its dump and applying every diff
    /// keyed between the dump boundary and the target slot, in slot order.
    pub(crate) fn reconstruct_diffed_uint64_list(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
        bucket: &'static str,
        suffix: DumpSuffix,
    ) -> Result<Vec<u8>> {
        interrupt.check()?;

        let dump_slot = self.snapshots.dump_slot(slot);
        let mut list = self.snapshots.load_dump(slot, suffix)?;
        let mut applied = 0_u64;

        for pair in database.iterator_ascending(bucket, encode_slot_key(dump_slot))? {
            interrupt.check()?;

            let (key, diff) = pair?;

            ensure!(key.len() == SLOT_KEY_LENGTH, Error::CorruptDiff {
                slot,
                reason: "diff key has the wrong width",
            });

            let key_slot = decode_slot_key(&key)?;

            if key_slot > slot {
                break;
            }

            apply_uint64_list_diff(&mut list, key_slot, &diff)?;
            applied += 1;
        }

        debug!("applied {applied} {suffix} diffs over the dump at slot {dump_slot}");

        Ok(list)
    }

    /// Balance diffs are emitted per epoch, so epoch-aligned keys between the
    /// dump boundary and the target epoch are fetched directly; the cursor
    /// scan only covers the final partial epoch. Boundary keys belong to the
    /// epoch walk, never to the scan.
    pub(crate) fn reconstruct_balances(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
    ) -> Result<Vec<u8>> {
        interrupt.check()?;

        let slots_per_epoch = P::SLOTS_PER_EPOCH.get();
        let dump_slot = self.snapshots.dump_slot(slot);
        let rounded_slot = misc::round_slot_to_epoch::<P>(slot);

        let mut list = self.snapshots.load_dump(slot, DumpSuffix::Balances)?;

        let mut boundary = dump_slot;

        while boundary < rounded_slot {
            interrupt.check()?;

            if let Some(diff) = database.get(buckets::VALIDATOR_BALANCE, encode_slot_key(boundary))?
            {
                if !diff.is_empty() {
                    apply_uint64_list_diff(&mut list, boundary, &diff)?;
                }
            }

            boundary += slots_per_epoch;
        }

        for pair in
            database.iterator_ascending(buckets::VALIDATOR_BALANCE, encode_slot_key(rounded_slot))?
        {
            interrupt.check()?;

            let (key, diff) = pair?;

            ensure!(key.len() == SLOT_KEY_LENGTH, Error::CorruptDiff {
                slot,
                reason: "diff key has the wrong width",
            });

            let key_slot = decode_slot_key(&key)?;

            if key_slot > slot {
                break;
            }

            if key_slot == rounded_slot {
                continue;
            }

            apply_uint64_list_diff(&mut list, key_slot, &diff)?;
        }

        Ok(list)
    }

    /// Some lists (slashings, inactivity scores) persist full compressed
    /// dumps per epoch rather than deltas. The nearest dump at or below the
    /// slot is authoritative.
    pub(crate) fn reconstruct_uint64_list_dump(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
        bucket: &'static str,
        size: usize,
    ) -> Result<Vec<u64>> {
        interrupt.check()?;

        let key = encode_slot_key(slot);

        let landed = match database.next(bucket, key)? {
            Some((landed_key, value)) => {
                if decode_slot_key(&landed_key)? <= slot {
                    Some((landed_key, value))
                } else {
                    database.prev(bucket, key)?
                }
            }
            None => database.prev(bucket, key)?,
        };

        let Some((_, compressed)) = landed else {
            bail!(Error::CorruptDiff {
                slot,
                reason: "no dump found at or before the slot",
            });
        };

        let mut buffer = vec![0; size * size_of::<u64>()];

        let mut decoder =
            zstd::Decoder::new(compressed.as_slice()).map_err(|_| Error::CorruptDiff {
                slot,
                reason: "dump is not a valid zstd frame",
            })?;

        // Dumps may be shorter than the full vector; the tail stays zero.
        crate::base_encoding::read_zstd(&mut decoder, &mut buffer)?;

        Ok(buffer
            .chunks_exact(size_of::<u64>())
            .map(|chunk| u64::from_le_bytes(chunk.try_into().expect("chunks are 8 bytes")))
            .collect())
    }

    /// Builds the validator set from the static table, then fills in the
    /// effective balances reconstructed from dumps and diffs. Also collects
    /// the active index sets of the current and previous epochs for the
    /// committee engine.
    fn read_validators_for_historical_state(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
        validators_length: u64,
    ) -> Result<(Vec<Validator>, Vec<ValidatorIndex>, Vec<ValidatorIndex>)> {
        let epoch = misc::compute_epoch_at_slot::<P>(slot);

        let mut validators = Vec::with_capacity(usize::try_from(validators_length)?);
        let mut current_active = Vec::new();
        let mut previous_active = Vec::new();

        self.validator_table.read().for_each(|index, record| {
            if index >= validators_length {
                return false;
            }

            let mut validator = Validator::default();
            record.to_validator(&mut validator, slot);

            if validator.is_active_at(epoch) {
                current_active.push(index);
            }

            if epoch > 0 && validator.is_active_at(epoch - 1) {
                previous_active.push(index);
            }

            validators.push(validator);
            true
        });

        if epoch == 0 {
            previous_active.clone_from(&current_active);
        }

        let effective_balances = self.reconstruct_diffed_uint64_list(
            interrupt,
            database,
            slot,
            buckets::VALIDATOR_EFFECTIVE_BALANCE,
            DumpSuffix::EffectiveBalances,
        )?;

        ensure!(
            effective_balances.len() >= validators.len() * size_of::<u64>(),
            Error::CorruptDiff {
                slot,
                reason: "effective balance list shorter than the validator set",
            },
        );

        for (index, validator) in validators.iter_mut().enumerate() {
            let offset = index * size_of::<u64>();
            validator.effective_balance = u64::from_le_bytes(
                effective_balances[offset..offset + size_of::<u64>()]
                    .try_into()
                    .expect("slice is 8 bytes"),
            );
        }

        Ok((validators, current_active, previous_active))
    }

    /// Votes accumulate over an eth1 voting period, so the scan starts at
    /// the period boundary, prepending the genesis votes when the period
    /// reaches back to genesis.
    fn read_eth1_data_votes(
        &self,
        interrupt: &Interrupt,
        database: &Database,
        slot: Slot,
        length: u64,
    ) -> Result<Vec<Eth1Data>> {
        interrupt.check()?;

        let initial_slot = misc::round_slot_to_vote_period::<P>(slot);

        let mut votes = Vec::with_capacity(usize::try_from(length)?);

        if initial_slot <= self.genesis_state.slot() {
            votes.extend(self.genesis_state.eth1_data_votes().iter().copied());
        }

        let slots_per_period =
            P::SLOTS_PER_EPOCH.get() * P::EPOCHS_PER_ETH1_VOTING_PERIOD.get();
        let end_slot = misc::round_slot_to_vote_period::<P>(slot + slots_per_period);

        for pair in database.iterator_ascending(buckets::ETH1_DATA_VOTES, encode_slot_key(initial_slot))? {
            if votes.len() as u64 >= length {
                break;
            }

            interrupt.check()?;

            let (key, value) = pair?;

            if decode_slot_key(&key)? >= end_slot {
                break;
            }

            let vote = Eth1Data::from_ssz_bytes(&value).map_err(|error| Error::DecodeFailure {
                context: "eth1 data vote",
                details: format!("{error:?}"),
            })?;

            votes.push(vote);
        }

        Ok(votes)
    }

    /// Pre-Altair participation: the pending attestation lists persisted per
    /// epoch, truncated to the lengths recorded in the summary.
    fn read_pending_epochs(
        &self,
        database: &Database,
        slot: Slot,
        current_length: u64,
        previous_length: u64,
    ) -> Result<(Attestations<P>, Attestations<P>)> {
        if slot < P::SLOTS_PER_EPOCH.get() {
            let current = self
                .genesis_state
                .current_epoch_attestations()
                .cloned()
                .ok_or(Error::Internal("phase0 genesis state has no attestation lists"))?;
            let previous = self
                .genesis_state
                .previous_epoch_attestations()
                .cloned()
                .ok_or(Error::Internal("phase0 genesis state has no attestation lists"))?;

            return Ok((current, previous));
        }

        let rounded_slot = misc::round_slot_to_epoch::<P>(slot);

        let current = accessors::read_current_epoch_attestations::<P>(database, rounded_slot)?
            .unwrap_or_default();
        let previous = accessors::read_previous_epoch_attestations::<P>(database, rounded_slot)?
            .unwrap_or_default();

        Ok((
            truncate_list(current, current_length)?,
            truncate_list(previous, previous_length)?,
        ))
    }
}

struct AltairFields<P: Preset> {
    inactivity_scores: InactivityScores<P>,
    current_sync_committee: Arc<SyncCommittee<P>>,
    next_sync_committee: Arc<SyncCommittee<P>>,
}

fn truncate_list<P: Preset>(
    list: Attestations<P>,
    length: u64,
) -> Result<Attestations<P>> {
    if list.len() as u64 <= length {
        return Ok(list);
    }

    let truncated = list
        .iter()
        .take(usize::try_from(length)?)
        .cloned()
        .collect::<Vec<_>>();

    into_list::<_, P::MaxPendingAttestations>(truncated)
}

fn into_vector<T, N: ssz_types::typenum::Unsigned>(
    elements: Vec<T>,
) -> Result<ssz_types::FixedVector<T, N>> {
    ssz_types::FixedVector::new(elements)
        .map_err(|_| Error::Internal("reconstructed vector has the wrong length").into())
}

fn into_list<T, N: ssz_types::typenum::Unsigned>(
    elements: Vec<T>,
) -> Result<ssz_types::VariableList<T, N>> {
    ssz_types::VariableList::new(elements)
        .map_err(|_| Error::Internal("reconstructed list exceeds its limit").into())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ssz_types::{BitList, VariableList};
    use tempfile::TempDir;

    use crate::state_summary::store_state_summary;
    use types::{
        nonstandard::Phase,
        phase0::{
            consts::FAR_FUTURE_EPOCH,
            containers::{
                Attestation, AttestationData, BeaconBlock, BeaconBlockBody, Checkpoint, Fork,
            },
            primitives::{Epoch, PublicKeyBytes, SignatureBytes},
        },
        preset::Mainnet,
    };

    use super::*;

    const LATEST: Slot = 3000;
    const VALIDATOR_COUNT: u64 = 4;
    const GWEI: u64 = 1_000_000_000;

    struct Harness {
        config: Arc<Config>,
        database: Database,
        directory: TempDir,
        validator_table: Arc<RwLock<StaticValidatorTable>>,
        blocks: HashMap<Slot, Arc<SignedBeaconBlock<Mainnet>>>,
        genesis_state: Arc<BeaconState<Mainnet>>,
    }

    impl Harness {
        fn new(altair_fork_epoch: Epoch, genesis_state: BeaconState<Mainnet>) -> Result<Self> {
            let config = Arc::new(Config {
                altair_fork_epoch,
                ..Config::mainnet()
            });

            let database = Database::in_memory();
            accessors::store_state_processing_progress(&database, LATEST)?;

            let mut validator_table = StaticValidatorTable::new();

            for index in 0..VALIDATOR_COUNT {
                validator_table.push_validator(
                    PublicKeyBytes::repeat_byte(index as u8 + 1),
                    H256::repeat_byte(0x0f),
                    0,
                    0,
                    FAR_FUTURE_EPOCH,
                    FAR_FUTURE_EPOCH,
                    false,
                    0,
                );
            }

            validator_table.set_slot(LATEST);

            Ok(Self {
                config,
                database,
                directory: TempDir::new()?,
                validator_table: Arc::new(RwLock::new(validator_table)),
                blocks: HashMap::new(),
                genesis_state: Arc::new(genesis_state),
            })
        }

        fn reader(&self) -> HistoricalStatesReader<Mainnet> {
            HistoricalStatesReader::new(
                Arc::clone(&self.config),
                self.directory.path(),
                Arc::new(MapBlockReader {
                    blocks: self.blocks.clone(),
                }),
                Arc::clone(&self.validator_table),
                Arc::clone(&self.genesis_state),
                Arc::new(ShuffledSetsCache::new()),
            )
        }

        fn populate_history(&self, up_to_slot: Slot) -> Result<()> {
            for slot in 1..=up_to_slot {
                let key = encode_slot_key(slot);
                self.database.put(buckets::BLOCK_ROOT, key, root_at(slot))?;
                self.database.put(buckets::STATE_ROOT, key, root_at(slot))?;
            }

            let epochs = misc::compute_epoch_at_slot::<Mainnet>(up_to_slot);

            for epoch in 0..=epochs {
                self.database.put(
                    buckets::RANDAO_MIXES,
                    encode_slot_key(misc::compute_start_slot_at_epoch::<Mainnet>(epoch)),
                    mix_at(epoch),
                )?;
            }

            self.database.put(
                buckets::INTRA_RANDAO_MIXES,
                encode_slot_key(up_to_slot),
                intra_mix_at(up_to_slot),
            )?;

            Ok(())
        }

        fn store_summary(&self, slot: Slot, phase: Phase) -> Result<()> {
            store_state_summary(&self.database, slot, &summary_at(phase))
        }

        fn store_registry_dumps(&self, slot: Slot, balances: &[u64]) -> Result<()> {
            let reader = self.reader();

            reader.snapshots().store_dump(
                slot,
                DumpSuffix::Balances,
                &u64_list_bytes(balances),
            )?;

            reader.snapshots().store_dump(
                slot,
                DumpSuffix::EffectiveBalances,
                &u64_list_bytes(&vec![32 * GWEI; balances.len()]),
            )?;

            // Slashings and inactivity scores are zero. Short dumps leave the
            // tails zero-filled.
            self.database.put(
                buckets::VALIDATOR_SLASHINGS,
                encode_slot_key(slot),
                zstd_frame(&[]),
            )?;

            self.database.put(
                buckets::INACTIVITY_SCORES,
                encode_slot_key(slot),
                zstd_frame(&u64_list_bytes(&vec![0; balances.len()])),
            )?;

            Ok(())
        }
    }

    struct MapBlockReader {
        blocks: HashMap<Slot, Arc<SignedBeaconBlock<Mainnet>>>,
    }

    impl BlockReader<Mainnet> for MapBlockReader {
        fn read_block_by_slot(
            &self,
            interrupt: &Interrupt,
            _database: &Database,
            slot: Slot,
        ) -> Result<Option<Arc<SignedBeaconBlock<Mainnet>>>> {
            interrupt.check()?;
            Ok(self.blocks.get(&slot).cloned())
        }
    }

    fn summary_at(phase: Phase) -> StateSummary {
        StateSummary {
            phase_tag: phase as u8,
            fork: Fork::default(),
            eth1_data: Eth1Data::default(),
            eth1_deposit_index: 0,
            justification_bits: Default::default(),
            validators_length: VALIDATOR_COUNT,
            historical_roots_length: 0,
            historical_summaries_length: 0,
            eth1_data_votes_length: 0,
            current_epoch_attestations_length: 0,
            previous_epoch_attestations_length: 0,
            next_withdrawal_index: 0,
            next_withdrawal_validator_index: 0,
        }
    }

    fn block_at(slot: Slot, attestations: Vec<Attestation<Mainnet>>) -> Arc<SignedBeaconBlock<Mainnet>> {
        Arc::new(SignedBeaconBlock {
            message: BeaconBlock {
                slot,
                proposer_index: 0,
                parent_root: root_at(slot.saturating_sub(1)),
                state_root: H256::repeat_byte(0xaa),
                body_root: H256::repeat_byte(0xbb),
                body: BeaconBlockBody {
                    randao_reveal: SignatureBytes::ZERO,
                    eth1_data: Eth1Data::default(),
                    graffiti: H256::ZERO,
                    attestations: VariableList::new(attestations)
                        .expect("test attestation count is below the limit"),
                    execution_payload_header: None,
                },
            },
            signature: SignatureBytes::ZERO,
        })
    }

    fn root_at(slot: Slot) -> H256 {
        let mut bytes = [0; 32];
        bytes[24..].copy_from_slice(&slot.to_be_bytes());
        H256::new(bytes)
    }

    fn mix_at(epoch: Epoch) -> H256 {
        let mut bytes = [0xab; 32];
        bytes[..8].copy_from_slice(&epoch.to_be_bytes());
        H256::new(bytes)
    }

    fn intra_mix_at(slot: Slot) -> H256 {
        let mut bytes = [0xcd; 32];
        bytes[..8].copy_from_slice(&slot.to_be_bytes());
        H256::new(bytes)
    }

    fn u64_list_bytes(values: &[u64]) -> Vec<u8> {
        values.iter().copied().flat_map(u64::to_le_bytes).collect()
    }

    fn zstd_frame(payload: &[u8]) -> Vec<u8> {
        zstd::encode_all(payload, 0).expect("compressing test payloads never fails")
    }

    fn balance_diff(new_values: &[(u32, u64)], list_length: u64) -> Vec<u8> {
        let mut payload = (list_length * 8).to_le_bytes().to_vec();

        for (index, value) in new_values {
            payload.extend_from_slice(&(index * 8).to_be_bytes());
            payload.extend_from_slice(&8_u32.to_be_bytes());
            payload.extend_from_slice(&value.to_le_bytes());
        }

        zstd_frame(&payload)
    }

    #[test]
    fn slot_zero_returns_a_copy_of_genesis() -> Result<()> {
        let genesis = BeaconState::Phase0(Phase0BeaconState::default());
        let harness = Harness::new(FAR_FUTURE_EPOCH, genesis.clone())?;

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, 0)?
            .expect("genesis is always available");

        assert_eq!(state, genesis);

        Ok(())
    }

    #[test]
    fn slots_past_the_progress_frontier_are_refused() -> Result<()> {
        let harness = Harness::new(
            FAR_FUTURE_EPOCH,
            BeaconState::Phase0(Phase0BeaconState::default()),
        )?;

        let error = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, LATEST + 1)
            .expect_err("the slot is ahead of ingestion");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::SlotAhead { .. }),
        ));

        Ok(())
    }

    #[test]
    fn a_missing_block_at_the_target_slot_is_an_error() -> Result<()> {
        let harness = Harness::new(
            FAR_FUTURE_EPOCH,
            BeaconState::Phase0(Phase0BeaconState::default()),
        )?;

        let error = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, 2500)
            .expect_err("no block was stored at the slot");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::BlockMissing { slot: 2500 }),
        ));

        Ok(())
    }

    #[test]
    fn a_slot_that_was_never_ingested_yields_no_state() -> Result<()> {
        let mut harness = Harness::new(
            FAR_FUTURE_EPOCH,
            BeaconState::Phase0(Phase0BeaconState::default()),
        )?;

        harness.blocks.insert(2500, block_at(2500, vec![]));

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, 2500)?;

        assert_eq!(state, None);

        Ok(())
    }

    #[test]
    fn an_interrupted_reconstruction_aborts() -> Result<()> {
        let harness = Harness::new(
            FAR_FUTURE_EPOCH,
            BeaconState::Phase0(Phase0BeaconState::default()),
        )?;

        let interrupt = Interrupt::new();
        interrupt.interrupt();

        let error = harness
            .reader()
            .read_historical_state(&interrupt, &harness.database, 1)
            .expect_err("the token was tripped before the call");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::Interrupted),
        ));

        Ok(())
    }

    #[test]
    fn dump_boundary_balances_equal_the_dump_content() -> Result<()> {
        let slot = 2048;

        let mut harness = Harness::new(
            FAR_FUTURE_EPOCH,
            BeaconState::Phase0(Phase0BeaconState::default()),
        )?;

        let balances = [32 * GWEI, 32 * GWEI, 32 * GWEI, 31 * GWEI];

        harness.populate_history(slot)?;
        harness.store_summary(slot, Phase::Phase0)?;
        harness.store_registry_dumps(slot, &balances)?;
        harness.blocks.insert(slot, block_at(slot, vec![]));

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?
            .expect("the slot was ingested");

        assert_eq!(state.phase(), Phase::Phase0);
        assert_eq!(state.slot(), slot);
        assert_eq!(state.balances().to_vec(), balances);
        assert_eq!(state.validators().len() as u64, VALIDATOR_COUNT);
        assert_eq!(state.latest_block_header().state_root, H256::ZERO);
        assert_eq!(state.latest_block_header().body_root, H256::repeat_byte(0xbb));

        // Ring-buffer positions hold the roots of their slots.
        assert_eq!(state.block_roots()[(slot % 8192) as usize], root_at(slot));
        assert_eq!(state.block_roots()[(2000 % 8192) as usize], root_at(2000));

        // The current epoch's randao position reflects the intra-epoch mix.
        assert_eq!(state.randao_mixes()[64], intra_mix_at(slot));
        assert_eq!(state.randao_mixes()[63], mix_at(63));

        Ok(())
    }

    #[test]
    fn epoch_zero_states_inherit_the_genesis_pending_attestations() -> Result<()> {
        let slot = 31;

        let pending = types::phase0::containers::PendingAttestation::<Mainnet> {
            aggregation_bits: BitList::with_capacity(1).expect("one bit is below the limit"),
            data: AttestationData::default(),
            inclusion_delay: 1,
            proposer_index: 0,
        };

        let mut genesis = Phase0BeaconState::<Mainnet>::default();
        genesis.current_epoch_attestations =
            VariableList::new(vec![pending.clone()]).expect("one attestation is below the limit");
        genesis.previous_epoch_attestations =
            VariableList::new(vec![pending]).expect("one attestation is below the limit");

        let genesis = BeaconState::Phase0(genesis);
        let mut harness = Harness::new(FAR_FUTURE_EPOCH, genesis.clone())?;

        harness.populate_history(slot)?;
        harness.store_registry_dumps(slot, &[32 * GWEI; 4])?;
        harness.blocks.insert(slot, block_at(slot, vec![]));

        let mut summary = summary_at(Phase::Phase0);
        summary.eth1_data_votes_length = 2;
        store_state_summary(&harness.database, slot, &summary)?;

        for vote_slot in [5, 9, 13] {
            harness.database.put(
                buckets::ETH1_DATA_VOTES,
                encode_slot_key(vote_slot),
                ssz::Encode::as_ssz_bytes(&Eth1Data {
                    deposit_count: vote_slot,
                    ..Eth1Data::default()
                }),
            )?;
        }

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?
            .expect("the slot was ingested");

        // The previous epoch collapses into epoch 0; both pending lists come
        // straight from genesis.
        assert_eq!(
            state.current_epoch_attestations(),
            genesis.current_epoch_attestations(),
        );
        assert_eq!(
            state.previous_epoch_attestations(),
            genesis.previous_epoch_attestations(),
        );

        // Votes are read from the period start and cut off at the recorded
        // length.
        let deposit_counts = state
            .eth1_data_votes()
            .iter()
            .map(|vote| vote.deposit_count)
            .collect::<Vec<_>>();

        assert_eq!(deposit_counts, [5, 9]);

        Ok(())
    }

    #[test]
    fn capella_states_carry_the_post_fork_fields() -> Result<()> {
        let slot = 2080;

        let mut harness = Harness::new(0, BeaconState::Capella(CapellaBeaconState::default()))?;

        harness.populate_history(slot)?;
        harness.store_registry_dumps(slot, &[32 * GWEI; 4])?;

        let mut summary = summary_at(Phase::Capella);
        summary.historical_summaries_length = 1;
        summary.next_withdrawal_index = 7;
        summary.next_withdrawal_validator_index = 2;
        store_state_summary(&harness.database, slot, &summary)?;

        let historical_summary = types::capella::containers::HistoricalSummary {
            block_summary_root: H256::repeat_byte(0x11),
            state_summary_root: H256::repeat_byte(0x22),
        };

        accessors::store_historical_summary(&harness.database, 0, &historical_summary)?;

        let payload_header = types::capella::containers::ExecutionPayloadHeader {
            block_number: 9000,
            ..Default::default()
        };

        let mut block = block_at(slot, vec![]);
        Arc::get_mut(&mut block)
            .expect("the block has a single owner")
            .message
            .body
            .execution_payload_header =
            Some(ExecutionPayloadHeader::Capella(payload_header.clone()));

        harness.blocks.insert(slot, block);

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?
            .expect("the slot was ingested");

        assert_eq!(state.phase(), Phase::Capella);
        assert_eq!(state.next_withdrawal_index(), Some(7));
        assert_eq!(state.next_withdrawal_validator_index(), Some(2));
        assert_eq!(
            state.historical_summaries().map(|summaries| summaries.to_vec()),
            Some(vec![historical_summary]),
        );
        assert_eq!(
            state.latest_execution_payload_header(),
            Some(ExecutionPayloadHeader::Capella(payload_header)),
        );

        Ok(())
    }

    #[test]
    fn one_epoch_past_the_dump_applies_exactly_the_boundary_diff() -> Result<()> {
        let slot = 2080;

        let mut harness = Harness::new(
            0,
            BeaconState::Altair(AltairBeaconState::default()),
        )?;

        let balances = [32 * GWEI, 32 * GWEI, 32 * GWEI, 31 * GWEI];

        harness.populate_history(slot)?;
        harness.store_summary(slot, Phase::Altair)?;
        harness.store_registry_dumps(slot, &balances)?;

        // The per-epoch diff at the dump boundary raises the first balance.
        harness.database.put(
            buckets::VALIDATOR_BALANCE,
            encode_slot_key(2048),
            balance_diff(&[(0, 33 * GWEI)], VALIDATOR_COUNT),
        )?;

        harness.blocks.insert(slot, block_at(slot, vec![]));

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?
            .expect("the slot was ingested");

        assert_eq!(state.phase(), Phase::Altair);
        assert_eq!(
            state.balances().to_vec(),
            [33 * GWEI, 32 * GWEI, 32 * GWEI, 31 * GWEI],
        );

        // Epoch 65 of the randao vector reflects the intra-epoch mix.
        assert_eq!(state.randao_mixes()[65], intra_mix_at(slot));

        // Participation bitfields cover the whole validator set and stay
        // empty when the replayed blocks carry no attestations.
        let current = state
            .current_epoch_participation()
            .expect("altair states carry participation");

        assert_eq!(current.len() as u64, VALIDATOR_COUNT);
        assert!(current.iter().all(|flags| *flags == 0));

        Ok(())
    }

    #[test]
    fn replayed_attestations_set_participation_flags() -> Result<()> {
        let slot = 2080;

        let mut harness = Harness::new(
            0,
            BeaconState::Altair(AltairBeaconState::default()),
        )?;

        let balances = [32 * GWEI; 4];

        harness.populate_history(slot)?;
        harness.store_summary(slot, Phase::Altair)?;
        harness.store_registry_dumps(slot, &balances)?;

        // A one-validator committee attesting to slot 2079 (epoch 64, the
        // previous epoch at slot 2080) with an inclusion delay of one slot.
        let data = AttestationData {
            slot: 2079,
            index: 0,
            beacon_block_root: root_at(2079),
            source: Checkpoint::default(),
            target: Checkpoint {
                epoch: 64,
                root: root_at(2048),
            },
        };

        let mut aggregation_bits =
            BitList::<<Mainnet as Preset>::MaxValidatorsPerCommittee>::with_capacity(1)
                .expect("one bit is below the committee limit");
        aggregation_bits
            .set(0, true)
            .expect("index 0 is in bounds");

        let attestation = Attestation {
            aggregation_bits,
            data,
            signature: SignatureBytes::ZERO,
        };

        harness.blocks.insert(slot, block_at(slot, vec![attestation]));

        let state = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?
            .expect("the slot was ingested");

        let previous = state
            .previous_epoch_participation()
            .expect("altair states carry participation");

        let timely_all = 0b0000_0111;

        assert_eq!(
            previous.iter().filter(|flags| **flags == timely_all).count(),
            1,
            "exactly one committee member attested",
        );
        assert_eq!(
            previous.iter().filter(|flags| **flags == 0).count(),
            3,
        );

        let current = state
            .current_epoch_participation()
            .expect("altair states carry participation");

        assert!(current.iter().all(|flags| *flags == 0));

        Ok(())
    }

    #[test]
    fn reconstruction_is_deterministic_across_fresh_caches() -> Result<()> {
        let slot = 2080;

        let mut harness = Harness::new(
            0,
            BeaconState::Altair(AltairBeaconState::default()),
        )?;

        harness.populate_history(slot)?;
        harness.store_summary(slot, Phase::Altair)?;
        harness.store_registry_dumps(slot, &[32 * GWEI; 4])?;
        harness.blocks.insert(slot, block_at(slot, vec![]));

        let first = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?;
        let second = harness
            .reader()
            .read_historical_state(&Interrupt::new(), &harness.database, slot)?;

        assert_eq!(first, second);

        Ok(())
    }
}
