//! Named buckets of the state archive.
//!
//! Keys are 4-byte big-endian slots (see [`base_encoding`](crate::base_encoding))
//! unless noted otherwise.

/// 32-byte block root per slot.
pub const BLOCK_ROOT: &str = "block_root";
/// 32-byte state root per slot.
pub const STATE_ROOT: &str = "state_root";
/// 32-byte randao mix per epoch-start slot.
pub const RANDAO_MIXES: &str = "randao_mixes";
/// 32-byte randao mix per slot, reflecting the most recent block's reveal.
pub const INTRA_RANDAO_MIXES: &str = "intra_randao_mixes";
/// SSZ `Eth1Data` per slot a vote was cast in.
pub const ETH1_DATA_VOTES: &str = "eth1_data_votes";
/// Compressed balance-list diffs.
pub const VALIDATOR_BALANCE: &str = "validator_balance";
/// Compressed effective-balance-list diffs.
pub const VALIDATOR_EFFECTIVE_BALANCE: &str = "validator_effective_balance";
/// Zstd-compressed full slashings vectors per epoch.
pub const VALIDATOR_SLASHINGS: &str = "validator_slashings";
/// Zstd-compressed full inactivity-score lists per epoch.
pub const INACTIVITY_SCORES: &str = "inactivity_scores";
/// SSZ [`StateSummary`](crate::state_summary::StateSummary) per slot.
pub const STATE_SUMMARIES: &str = "state_summaries";
/// SSZ finality checkpoint triple per epoch-start slot.
pub const CHECKPOINTS: &str = "checkpoints";
/// SSZ sync committee per sync-committee-period-start slot.
pub const CURRENT_SYNC_COMMITTEE: &str = "current_sync_committee";
pub const NEXT_SYNC_COMMITTEE: &str = "next_sync_committee";
/// 32-byte roots keyed by list index rather than slot.
pub const HISTORICAL_ROOTS: &str = "historical_roots";
/// SSZ `HistoricalSummary` keyed by list index rather than slot.
pub const HISTORICAL_SUMMARIES: &str = "historical_summaries";
/// SSZ pending-attestation lists per epoch-start slot (pre-Altair only).
pub const CURRENT_EPOCH_ATTESTATIONS: &str = "current_epoch_attestations";
pub const PREVIOUS_EPOCH_ATTESTATIONS: &str = "previous_epoch_attestations";
/// Ingestion progress; single fixed key.
pub const PROGRESS: &str = "progress";

/// Every bucket the reader touches, for opening persistent databases.
pub const ALL: &[&str] = &[
    BLOCK_ROOT,
    STATE_ROOT,
    RANDAO_MIXES,
    INTRA_RANDAO_MIXES,
    ETH1_DATA_VOTES,
    VALIDATOR_BALANCE,
    VALIDATOR_EFFECTIVE_BALANCE,
    VALIDATOR_SLASHINGS,
    INACTIVITY_SCORES,
    STATE_SUMMARIES,
    CHECKPOINTS,
    CURRENT_SYNC_COMMITTEE,
    NEXT_SYNC_COMMITTEE,
    HISTORICAL_ROOTS,
    HISTORICAL_SUMMARIES,
    CURRENT_EPOCH_ATTESTATIONS,
    PREVIOUS_EPOCH_ATTESTATIONS,
    PROGRESS,
];
