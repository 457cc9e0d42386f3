//! Reconstruction of historical beacon states from the differential archive.
//!
//! States are never re-executed. A state at slot `s` is assembled from
//! periodic full snapshots of the validator-indexed lists, per-epoch binary
//! diffs over them, a per-slot record of the small scalar fields, the
//! in-memory static validator table, and a replay of the attestations of the
//! two relevant epochs for the participation bitfields.

pub mod accessors;
pub mod base_encoding;
pub mod buckets;
pub mod committees;
pub mod error;
pub mod interrupt;
pub mod misc;
pub mod reader;
pub mod snapshots;
pub mod state_summary;
pub mod validator_table;

mod participation;

pub use crate::{
    committees::ShuffledSetsCache,
    error::Error,
    interrupt::Interrupt,
    reader::{BlockReader, HistoricalStatesReader},
    snapshots::SnapshotStore,
    state_summary::StateSummary,
    validator_table::{StaticValidator, StaticValidatorTable},
};
