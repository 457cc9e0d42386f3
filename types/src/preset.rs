use core::fmt::Debug;
use core::num::NonZeroU64;

use nonzero_ext::nonzero;
use ssz_types::typenum::{
    Unsigned, U1024, U1099511627776, U128, U16777216, U2048, U32, U4096, U512, U64, U65536, U8192,
};

/// Compile-time sizes of the preset-scale collections.
///
/// Mirrors the presets in `consensus-specs`. Only the values the state
/// archive actually touches are carried here; runtime-configurable variables
/// live in [`Config`](crate::config::Config).
pub trait Preset: Copy + Clone + Debug + Default + Eq + Send + Sync + 'static {
    type SlotsPerHistoricalRoot: Unsigned + Clone + Debug + Eq + Send + Sync;
    type EpochsPerHistoricalVector: Unsigned + Clone + Debug + Eq + Send + Sync;
    type EpochsPerSlashingsVector: Unsigned + Clone + Debug + Eq + Send + Sync;
    type HistoricalRootsLimit: Unsigned + Clone + Debug + Eq + Send + Sync;
    type Eth1DataVotesLimit: Unsigned + Clone + Debug + Eq + Send + Sync;
    type ValidatorRegistryLimit: Unsigned + Clone + Debug + Eq + Send + Sync;
    type MaxValidatorsPerCommittee: Unsigned + Clone + Debug + Eq + Send + Sync;
    type MaxAttestations: Unsigned + Clone + Debug + Eq + Send + Sync;
    type MaxPendingAttestations: Unsigned + Clone + Debug + Eq + Send + Sync;
    type SyncCommitteeSize: Unsigned + Clone + Debug + Eq + Send + Sync;

    const SLOTS_PER_EPOCH: NonZeroU64;
    const SHUFFLE_ROUND_COUNT: u8;
    const TARGET_COMMITTEE_SIZE: NonZeroU64;
    const MAX_COMMITTEES_PER_SLOT: NonZeroU64;
    const MIN_SEED_LOOKAHEAD: u64;
    const MIN_ATTESTATION_INCLUSION_DELAY: NonZeroU64;
    const EPOCHS_PER_ETH1_VOTING_PERIOD: NonZeroU64;
    const EPOCHS_PER_SYNC_COMMITTEE_PERIOD: NonZeroU64;
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Mainnet;

impl Preset for Mainnet {
    type SlotsPerHistoricalRoot = U8192;
    type EpochsPerHistoricalVector = U65536;
    type EpochsPerSlashingsVector = U8192;
    type HistoricalRootsLimit = U16777216;
    type Eth1DataVotesLimit = U2048;
    type ValidatorRegistryLimit = U1099511627776;
    type MaxValidatorsPerCommittee = U2048;
    type MaxAttestations = U128;
    type MaxPendingAttestations = U4096;
    type SyncCommitteeSize = U512;

    const SLOTS_PER_EPOCH: NonZeroU64 = nonzero!(32_u64);
    const SHUFFLE_ROUND_COUNT: u8 = 90;
    const TARGET_COMMITTEE_SIZE: NonZeroU64 = nonzero!(128_u64);
    const MAX_COMMITTEES_PER_SLOT: NonZeroU64 = nonzero!(64_u64);
    const MIN_SEED_LOOKAHEAD: u64 = 1;
    const MIN_ATTESTATION_INCLUSION_DELAY: NonZeroU64 = nonzero!(1_u64);
    const EPOCHS_PER_ETH1_VOTING_PERIOD: NonZeroU64 = nonzero!(64_u64);
    const EPOCHS_PER_SYNC_COMMITTEE_PERIOD: NonZeroU64 = nonzero!(256_u64);
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Minimal;

impl Preset for Minimal {
    type SlotsPerHistoricalRoot = U64;
    type EpochsPerHistoricalVector = U64;
    type EpochsPerSlashingsVector = U64;
    type HistoricalRootsLimit = U16777216;
    type Eth1DataVotesLimit = U32;
    type ValidatorRegistryLimit = U1099511627776;
    type MaxValidatorsPerCommittee = U2048;
    type MaxAttestations = U128;
    type MaxPendingAttestations = U1024;
    type SyncCommitteeSize = U32;

    const SLOTS_PER_EPOCH: NonZeroU64 = nonzero!(8_u64);
    const SHUFFLE_ROUND_COUNT: u8 = 10;
    const TARGET_COMMITTEE_SIZE: NonZeroU64 = nonzero!(4_u64);
    const MAX_COMMITTEES_PER_SLOT: NonZeroU64 = nonzero!(4_u64);
    const MIN_SEED_LOOKAHEAD: u64 = 1;
    const MIN_ATTESTATION_INCLUSION_DELAY: NonZeroU64 = nonzero!(1_u64);
    const EPOCHS_PER_ETH1_VOTING_PERIOD: NonZeroU64 = nonzero!(4_u64);
    const EPOCHS_PER_SYNC_COMMITTEE_PERIOD: NonZeroU64 = nonzero!(8_u64);
}
