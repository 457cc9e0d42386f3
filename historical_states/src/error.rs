use std::path::PathBuf;

use thiserror::Error;
use types::phase0::primitives::Slot;

/// Failures surfaced by state reconstruction.
///
/// Everything here aborts the whole reconstruction. A missing per-slot
/// summary is not an error; it is reported as `Ok(None)` by the reader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("slot {slot} is ahead of the latest processed slot {latest}")]
    SlotAhead { slot: Slot, latest: Slot },

    #[error("block at slot {slot} not found")]
    BlockMissing { slot: Slot },

    #[error("snapshot file missing: {path}")]
    SnapshotMissing { path: PathBuf },

    #[error("snapshot file corrupt: {path}")]
    CorruptSnapshot { path: PathBuf },

    #[error("corrupt diff at slot {slot}: {reason}")]
    CorruptDiff { slot: Slot, reason: &'static str },

    #[error("failed to decode {context}: {details}")]
    DecodeFailure {
        context: &'static str,
        details: String,
    },

    #[error("reconstruction interrupted")]
    Interrupted,

    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}
