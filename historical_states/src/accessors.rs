//! Readers and writers for the simple SSZ-record buckets.
//!
//! These cover the fields the orchestrator fetches wholesale: finality
//! checkpoints, sync committees, historical roots and summaries, pre-Altair
//! pending attestations, and the ingestion progress marker. The write half
//! defines the formats and doubles as the test fixture path; the production
//! writer lives with the ingestion pipeline.

use anyhow::Result;
use database::Database;
use ssz::{Decode, Encode as _};
use ssz_derive::{Decode as DeriveDecode, Encode as DeriveEncode};

use crate::{base_encoding::encode_slot_key, buckets, error::Error};
use types::{
    altair::containers::SyncCommittee,
    capella::containers::HistoricalSummary,
    collections::Attestations,
    phase0::{
        containers::Checkpoint,
        primitives::{Slot, H256},
    },
    preset::Preset,
};

const PROGRESS_KEY: &[u8] = b"state_processing_progress";

/// The justification state persisted once per epoch.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, DeriveEncode, DeriveDecode)]
pub struct FinalityCheckpoints {
    pub previous_justified: Checkpoint,
    pub current_justified: Checkpoint,
    pub finalized: Checkpoint,
}

fn decode_ssz<T: Decode>(context: &'static str, bytes: &[u8]) -> Result<T> {
    T::from_ssz_bytes(bytes).map_err(|error| {
        Error::DecodeFailure {
            context,
            details: format!("{error:?}"),
        }
        .into()
    })
}

pub fn read_checkpoints(
    database: &Database,
    rounded_slot: Slot,
) -> Result<Option<FinalityCheckpoints>> {
    database
        .get(buckets::CHECKPOINTS, encode_slot_key(rounded_slot))?
        .map(|bytes| decode_ssz("finality checkpoints", &bytes))
        .transpose()
}

pub fn store_checkpoints(
    database: &Database,
    rounded_slot: Slot,
    checkpoints: &FinalityCheckpoints,
) -> Result<()> {
    database.put(
        buckets::CHECKPOINTS,
        encode_slot_key(rounded_slot),
        checkpoints.as_ssz_bytes(),
    )
}

pub fn read_current_sync_committee<P: Preset>(
    database: &Database,
    period_slot: Slot,
) -> Result<Option<SyncCommittee<P>>> {
    database
        .get(buckets::CURRENT_SYNC_COMMITTEE, encode_slot_key(period_slot))?
        .map(|bytes| decode_ssz("current sync committee", &bytes))
        .transpose()
}

pub fn read_next_sync_committee<P: Preset>(
    database: &Database,
    period_slot: Slot,
) -> Result<Option<SyncCommittee<P>>> {
    database
        .get(buckets::NEXT_SYNC_COMMITTEE, encode_slot_key(period_slot))?
        .map(|bytes| decode_ssz("next sync committee", &bytes))
        .transpose()
}

pub fn store_sync_committees<P: Preset>(
    database: &Database,
    period_slot: Slot,
    current: &SyncCommittee<P>,
    next: &SyncCommittee<P>,
) -> Result<()> {
    let key = encode_slot_key(period_slot);
    database.put(buckets::CURRENT_SYNC_COMMITTEE, key, current.as_ssz_bytes())?;
    database.put(buckets::NEXT_SYNC_COMMITTEE, key, next.as_ssz_bytes())
}

/// Reads the first `length` historical roots in index order.
pub fn read_historical_roots(database: &Database, length: u64) -> Result<Vec<H256>> {
    let mut roots = Vec::with_capacity(usize::try_from(length)?);

    for pair in database.iterator_ascending(buckets::HISTORICAL_ROOTS, encode_slot_key(0)..)? {
        if roots.len() as u64 >= length {
            break;
        }

        let (_, value) = pair?;

        if value.len() != H256::len_bytes() {
            return Err(Error::DecodeFailure {
                context: "historical root",
                details: format!("expected 32 bytes, got {}", value.len()),
            }
            .into());
        }

        roots.push(H256::from_slice(&value));
    }

    Ok(roots)
}

pub fn store_historical_root(database: &Database, index: u64, root: H256) -> Result<()> {
    database.put(buckets::HISTORICAL_ROOTS, encode_slot_key(index), root)
}

/// Reads the first `length` historical summaries in index order.
pub fn read_historical_summaries(
    database: &Database,
    length: u64,
) -> Result<Vec<HistoricalSummary>> {
    let mut summaries = Vec::with_capacity(usize::try_from(length)?);

    for pair in database.iterator_ascending(buckets::HISTORICAL_SUMMARIES, encode_slot_key(0)..)? {
        if summaries.len() as u64 >= length {
            break;
        }

        let (_, value) = pair?;
        summaries.push(decode_ssz("historical summary", &value)?);
    }

    Ok(summaries)
}

pub fn store_historical_summary(
    database: &Database,
    index: u64,
    summary: &HistoricalSummary,
) -> Result<()> {
    database.put(
        buckets::HISTORICAL_SUMMARIES,
        encode_slot_key(index),
        summary.as_ssz_bytes(),
    )
}

pub fn read_current_epoch_attestations<P: Preset>(
    database: &Database,
    rounded_slot: Slot,
) -> Result<Option<Attestations<P>>> {
    database
        .get(
            buckets::CURRENT_EPOCH_ATTESTATIONS,
            encode_slot_key(rounded_slot),
        )?
        .map(|bytes| decode_ssz("current epoch attestations", &bytes))
        .transpose()
}

pub fn read_previous_epoch_attestations<P: Preset>(
    database: &Database,
    rounded_slot: Slot,
) -> Result<Option<Attestations<P>>> {
    database
        .get(
            buckets::PREVIOUS_EPOCH_ATTESTATIONS,
            encode_slot_key(rounded_slot),
        )?
        .map(|bytes| decode_ssz("previous epoch attestations", &bytes))
        .transpose()
}

pub fn store_epoch_attestations<P: Preset>(
    database: &Database,
    rounded_slot: Slot,
    current: &Attestations<P>,
    previous: &Attestations<P>,
) -> Result<()> {
    let key = encode_slot_key(rounded_slot);
    database.put(
        buckets::CURRENT_EPOCH_ATTESTATIONS,
        key,
        current.as_ssz_bytes(),
    )?;
    database.put(
        buckets::PREVIOUS_EPOCH_ATTESTATIONS,
        key,
        previous.as_ssz_bytes(),
    )
}

/// The highest slot the ingestion pipeline has fully processed.
pub fn state_processing_progress(database: &Database) -> Result<Option<Slot>> {
    database
        .get(buckets::PROGRESS, PROGRESS_KEY)?
        .map(|bytes| {
            let array: [u8; size_of::<u64>()] =
                bytes.as_slice().try_into().map_err(|_| Error::DecodeFailure {
                    context: "state processing progress",
                    details: format!("expected 8 bytes, got {}", bytes.len()),
                })?;

            Ok(u64::from_le_bytes(array))
        })
        .transpose()
}

pub fn store_state_processing_progress(database: &Database, slot: Slot) -> Result<()> {
    database.put(buckets::PROGRESS, PROGRESS_KEY, slot.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use types::preset::Minimal;

    use super::*;

    #[test]
    fn checkpoints_round_trip() -> Result<()> {
        let database = Database::in_memory();

        let checkpoints = FinalityCheckpoints {
            previous_justified: Checkpoint {
                epoch: 1,
                root: H256::repeat_byte(1),
            },
            current_justified: Checkpoint {
                epoch: 2,
                root: H256::repeat_byte(2),
            },
            finalized: Checkpoint {
                epoch: 1,
                root: H256::repeat_byte(1),
            },
        };

        store_checkpoints(&database, 64, &checkpoints)?;

        assert_eq!(read_checkpoints(&database, 64)?, Some(checkpoints));
        assert_eq!(read_checkpoints(&database, 96)?, None);

        Ok(())
    }

    #[test]
    fn historical_roots_are_truncated_to_the_requested_length() -> Result<()> {
        let database = Database::in_memory();

        for index in 0..4_u64 {
            store_historical_root(&database, index, H256::repeat_byte(index as u8 + 1))?;
        }

        let roots = read_historical_roots(&database, 2)?;

        assert_eq!(
            roots,
            [H256::repeat_byte(1), H256::repeat_byte(2)],
        );

        Ok(())
    }

    #[test]
    fn sync_committees_round_trip() -> Result<()> {
        let database = Database::in_memory();

        let current = SyncCommittee::<Minimal>::default();
        let next = SyncCommittee::<Minimal>::default();

        store_sync_committees(&database, 0, &current, &next)?;

        assert_eq!(read_current_sync_committee(&database, 0)?, Some(current));
        assert_eq!(
            read_next_sync_committee::<Minimal>(&database, 64)?,
            None,
        );

        Ok(())
    }

    #[test]
    fn progress_round_trips() -> Result<()> {
        let database = Database::in_memory();

        assert_eq!(state_processing_progress(&database)?, None);

        store_state_processing_progress(&database, 2080)?;

        assert_eq!(state_processing_progress(&database)?, Some(2080));

        Ok(())
    }
}
