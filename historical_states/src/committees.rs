//! Deterministic committee assignment over cached shuffled sets.
//!
//! Shuffling the active set is the expensive step of attestation replay, so
//! shuffled sets are kept in a bounded process-lifetime cache shared by all
//! readers. Eviction is strictly recency-based.

use core::num::NonZeroUsize;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash as _, Hasher as _},
    sync::Arc,
};

use anyhow::{ensure, Result};
use lru::LruCache;
use nonzero_ext::nonzero;
use parking_lot::Mutex;
use ssz_types::{typenum::Unsigned as _, BitList};

use crate::{error::Error, misc};
use types::{
    collections::RandaoMixes,
    phase0::{
        consts::DOMAIN_BEACON_ATTESTER,
        primitives::{CommitteeIndex, Epoch, Slot, ValidatorIndex, H256},
    },
    preset::Preset,
};

const SHUFFLED_SETS_CACHE_SIZE: NonZeroUsize = nonzero!(125_usize);

/// Seed for the attester shuffle of `epoch`, derived from the randao mix at
/// `epoch - MIN_SEED_LOOKAHEAD - 1` the way `get_seed` does in
/// `consensus-specs`.
#[must_use]
pub fn attester_seed<P: Preset>(randao_mixes: &RandaoMixes<P>, epoch: Epoch) -> H256 {
    let vector_length = P::EpochsPerHistoricalVector::U64;
    let mix_epoch = (epoch + vector_length - P::MIN_SEED_LOOKAHEAD - 1) % vector_length;
    let mix = randao_mixes[usize::try_from(mix_epoch).expect("vector position fits in usize")];

    hashing::hash_32_64_256(DOMAIN_BEACON_ATTESTER.0, epoch, mix)
}

/// Bounded cache of shuffled active sets keyed by epoch and active-set
/// fingerprint. Init at startup, share by reference, drop at shutdown.
pub struct ShuffledSetsCache {
    cache: Mutex<LruCache<(Epoch, u64), Arc<[ValidatorIndex]>>>,
}

impl Default for ShuffledSetsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffledSetsCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(SHUFFLED_SETS_CACHE_SIZE)),
        }
    }

    /// Returns the shuffled active set for `epoch`, computing and caching it
    /// on a miss.
    pub fn shuffled_active_set<P: Preset>(
        &self,
        randao_mixes: &RandaoMixes<P>,
        epoch: Epoch,
        active_indices: &[ValidatorIndex],
    ) -> Result<Arc<[ValidatorIndex]>> {
        let key = (epoch, fingerprint(active_indices));

        if let Some(shuffled) = self.cache.lock().get(&key) {
            return Ok(Arc::clone(shuffled));
        }

        let seed = attester_seed::<P>(randao_mixes, epoch);

        let mut shuffled = active_indices.to_vec();
        shuffling::shuffle_slice(&mut shuffled, seed, P::SHUFFLE_ROUND_COUNT)?;

        let shuffled = Arc::<[ValidatorIndex]>::from(shuffled);
        self.cache.lock().put(key, Arc::clone(&shuffled));

        Ok(shuffled)
    }
}

fn fingerprint(active_indices: &[ValidatorIndex]) -> u64 {
    let mut hasher = DefaultHasher::new();
    active_indices.hash(&mut hasher);
    hasher.finish()
}

/// Warms the cache for the two epochs attestation replay will need. The
/// tasks communicate only through the cache; failures surface again on the
/// synchronous path.
pub fn try_cache_epochs_in_parallel<P: Preset>(
    cache: &ShuffledSetsCache,
    randao_mixes: &RandaoMixes<P>,
    active_sets: [&[ValidatorIndex]; 2],
    epochs: [Epoch; 2],
) {
    let [current_set, previous_set] = active_sets;
    let [current_epoch, previous_epoch] = epochs;

    rayon::join(
        || {
            cache
                .shuffled_active_set::<P>(randao_mixes, current_epoch, current_set)
                .ok()
        },
        || {
            cache
                .shuffled_active_set::<P>(randao_mixes, previous_epoch, previous_set)
                .ok()
        },
    );
}

/// Slices the committee for `(slot, committee_index)` out of a shuffled
/// active set, the way `compute_committee` does in `consensus-specs`.
pub fn beacon_committee<'indices, P: Preset>(
    shuffled_indices: &'indices [ValidatorIndex],
    slot: Slot,
    committee_index: CommitteeIndex,
    committees_per_slot: u64,
) -> Result<&'indices [ValidatorIndex]> {
    ensure!(
        committee_index < committees_per_slot,
        Error::DecodeFailure {
            context: "attestation",
            details: format!(
                "committee index {committee_index} out of bounds for {committees_per_slot} committees",
            ),
        },
    );

    let validator_count = shuffled_indices.len() as u64;
    let committees_in_epoch = committees_per_slot * P::SLOTS_PER_EPOCH.get();
    let slots_since_epoch_start = slot - misc::round_slot_to_epoch::<P>(slot);
    let index_in_epoch = slots_since_epoch_start * committees_per_slot + committee_index;
    let start = usize::try_from(validator_count * index_in_epoch / committees_in_epoch)?;
    let end = usize::try_from(validator_count * (index_in_epoch + 1) / committees_in_epoch)?;

    Ok(&shuffled_indices[start..end])
}

/// Validators of `committee` whose aggregation bit is set.
pub fn attesting_indices<'committee, P: Preset>(
    committee: &'committee [ValidatorIndex],
    aggregation_bits: &BitList<P::MaxValidatorsPerCommittee>,
) -> Result<impl Iterator<Item = ValidatorIndex> + 'committee> {
    ensure!(
        committee.len() == aggregation_bits.len(),
        Error::DecodeFailure {
            context: "attestation",
            details: format!(
                "aggregation bitfield has {} bits for a committee of {}",
                aggregation_bits.len(),
                committee.len(),
            ),
        },
    );

    let bits = aggregation_bits.iter().collect::<Vec<_>>();

    Ok(bits
        .into_iter()
        .zip(committee.iter().copied())
        .filter_map(|(present, validator_index)| present.then_some(validator_index)))
}
