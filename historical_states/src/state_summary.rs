use anyhow::Result;
use database::Database;
use ssz::{Decode as _, Encode as _};
use ssz_derive::{Decode, Encode};
use ssz_types::BitVector;

use crate::{base_encoding::encode_slot_key, buckets, error::Error};
use types::{
    nonstandard::Phase,
    phase0::{
        consts::JustificationBitsLength,
        containers::{Eth1Data, Fork},
        primitives::{DepositIndex, Slot, ValidatorIndex},
    },
};

/// The per-slot record of the small scalar state fields.
///
/// Everything too small to be worth diffing is persisted here verbatim, one
/// SSZ record per processed slot. Its absence means the slot was never
/// ingested.
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub struct StateSummary {
    pub phase_tag: u8,
    pub fork: Fork,
    pub eth1_data: Eth1Data,
    pub eth1_deposit_index: DepositIndex,
    pub justification_bits: BitVector<JustificationBitsLength>,
    pub validators_length: u64,
    pub historical_roots_length: u64,
    pub historical_summaries_length: u64,
    pub eth1_data_votes_length: u64,
    pub current_epoch_attestations_length: u64,
    pub previous_epoch_attestations_length: u64,
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: ValidatorIndex,
}

impl StateSummary {
    pub fn phase(&self) -> Result<Phase> {
        Phase::from_repr(self.phase_tag)
            .ok_or(Error::Internal("state summary carries an unknown phase tag"))
            .map_err(Into::into)
    }
}

pub fn read_state_summary(database: &Database, slot: Slot) -> Result<Option<StateSummary>> {
    let Some(bytes) = database.get(buckets::STATE_SUMMARIES, encode_slot_key(slot))? else {
        return Ok(None);
    };

    StateSummary::from_ssz_bytes(&bytes)
        .map(Some)
        .map_err(|error| {
            Error::DecodeFailure {
                context: "state summary",
                details: format!("{error:?}"),
            }
            .into()
        })
}

pub fn store_state_summary(
    database: &Database,
    slot: Slot,
    summary: &StateSummary,
) -> Result<()> {
    database.put(
        buckets::STATE_SUMMARIES,
        encode_slot_key(slot),
        summary.as_ssz_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> StateSummary {
        StateSummary {
            phase_tag: Phase::Altair as u8,
            fork: Fork::default(),
            eth1_data: Eth1Data::default(),
            eth1_deposit_index: 3,
            justification_bits: BitVector::default(),
            validators_length: 100,
            historical_roots_length: 2,
            historical_summaries_length: 0,
            eth1_data_votes_length: 1,
            current_epoch_attestations_length: 0,
            previous_epoch_attestations_length: 0,
            next_withdrawal_index: 0,
            next_withdrawal_validator_index: 0,
        }
    }

    #[test]
    fn summaries_round_trip_through_the_database() -> Result<()> {
        let database = Database::in_memory();

        store_state_summary(&database, 2050, &summary())?;

        assert_eq!(read_state_summary(&database, 2050)?, Some(summary()));
        assert_eq!(read_state_summary(&database, 2051)?, None);

        Ok(())
    }

    #[test]
    fn unknown_phase_tags_are_rejected() {
        let mut summary = summary();
        summary.phase_tag = 200;

        summary.phase().expect_err("200 is not a phase");
    }
}
