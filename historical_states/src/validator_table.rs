//! Compact in-memory registry of per-validator attributes.
//!
//! Holding these hot saves the bulk of the I/O of a reconstruction: the
//! registry is most of a state by weight, and its fields change rarely. Each
//! attribute is a sparse sequence of (slot, value) change events; the value
//! at a slot is that of the latest event at or before it. Effective balances
//! are deliberately absent, they are reconstructed from dumps and diffs like
//! the other uint64 lists.

use anyhow::{ensure, Result};

use crate::error::Error;
use types::phase0::{
    containers::Validator,
    primitives::{Epoch, PublicKeyBytes, Slot, ValidatorIndex, H256},
};

#[derive(Clone, Debug)]
struct FieldEvents<T> {
    events: Vec<(Slot, T)>,
}

impl<T: Copy> FieldEvents<T> {
    fn new(slot: Slot, value: T) -> Self {
        Self {
            events: vec![(slot, value)],
        }
    }

    fn record(&mut self, slot: Slot, value: T) -> Result<()> {
        ensure!(
            self.events
                .last()
                .is_none_or(|(last_slot, _)| *last_slot < slot),
            Error::Internal("attribute change events must have strictly increasing slots"),
        );

        self.events.push((slot, value));

        Ok(())
    }

    fn value_at(&self, slot: Slot) -> T {
        let covered = self
            .events
            .partition_point(|(event_slot, _)| *event_slot <= slot);

        self.events[covered.saturating_sub(1)].1
    }
}

pub struct StaticValidator {
    pubkey: PublicKeyBytes,
    withdrawal_credentials: FieldEvents<H256>,
    activation_eligibility_epoch: FieldEvents<Epoch>,
    activation_epoch: FieldEvents<Epoch>,
    exit_epoch: FieldEvents<Epoch>,
    withdrawable_epoch: FieldEvents<Epoch>,
    slashed: FieldEvents<bool>,
}

impl StaticValidator {
    /// Resolves every attribute to its value at `slot`, leaving
    /// `out.effective_balance` untouched.
    pub fn to_validator(&self, out: &mut Validator, slot: Slot) {
        out.pubkey = self.pubkey;
        out.withdrawal_credentials = self.withdrawal_credentials.value_at(slot);
        out.activation_eligibility_epoch = self.activation_eligibility_epoch.value_at(slot);
        out.activation_epoch = self.activation_epoch.value_at(slot);
        out.exit_epoch = self.exit_epoch.value_at(slot);
        out.withdrawable_epoch = self.withdrawable_epoch.value_at(slot);
        out.slashed = self.slashed.value_at(slot);
    }
}

/// Shared, read-mostly table of every validator ever seen, in index order.
///
/// The ingestion pipeline appends validators and change events as it
/// processes blocks and advances [`slot`](Self::slot); readers treat that
/// slot as the frontier up to which materialization is consistent.
#[derive(Default)]
pub struct StaticValidatorTable {
    validators: Vec<StaticValidator>,
    slot: Slot,
}

impl StaticValidatorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[expect(clippy::too_many_arguments)]
    pub fn push_validator(
        &mut self,
        pubkey: PublicKeyBytes,
        withdrawal_credentials: H256,
        activation_eligibility_epoch: Epoch,
        activation_epoch: Epoch,
        exit_epoch: Epoch,
        withdrawable_epoch: Epoch,
        slashed: bool,
        slot: Slot,
    ) -> ValidatorIndex {
        self.validators.push(StaticValidator {
            pubkey,
            withdrawal_credentials: FieldEvents::new(slot, withdrawal_credentials),
            activation_eligibility_epoch: FieldEvents::new(slot, activation_eligibility_epoch),
            activation_epoch: FieldEvents::new(slot, activation_epoch),
            exit_epoch: FieldEvents::new(slot, exit_epoch),
            withdrawable_epoch: FieldEvents::new(slot, withdrawable_epoch),
            slashed: FieldEvents::new(slot, slashed),
        });

        self.validators.len() as ValidatorIndex - 1
    }

    pub fn record_withdrawal_credentials_change(
        &mut self,
        validator_index: ValidatorIndex,
        slot: Slot,
        credentials: H256,
    ) -> Result<()> {
        self.validator_mut(validator_index)?
            .withdrawal_credentials
            .record(slot, credentials)
    }

    pub fn record_activation_eligibility_change(
        &mut self,
        validator_index: ValidatorIndex,
        slot: Slot,
        epoch: Epoch,
    ) -> Result<()> {
        self.validator_mut(validator_index)?
            .activation_eligibility_epoch
            .record(slot, epoch)
    }

    pub fn record_activation_epoch_change(
        &mut self,
        validator_index: ValidatorIndex,
        slot: Slot,
        epoch: Epoch,
    ) -> Result<()> {
        self.validator_mut(validator_index)?
            .activation_epoch
            .record(slot, epoch)
    }

    pub fn record_exit_epoch_change(
        &mut self,
        validator_index: ValidatorIndex,
        slot: Slot,
        epoch: Epoch,
    ) -> Result<()> {
        self.validator_mut(validator_index)?
            .exit_epoch
            .record(slot, epoch)
    }

    pub fn record_withdrawable_epoch_change(
        &mut self,
        validator_index: ValidatorIndex,
        slot: Slot,
        epoch: Epoch,
    ) -> Result<()> {
        self.validator_mut(validator_index)?
            .withdrawable_epoch
            .record(slot, epoch)
    }

    pub fn record_slashed_change(
        &mut self,
        validator_index: ValidatorIndex,
        slot: Slot,
        slashed: bool,
    ) -> Result<()> {
        self.validator_mut(validator_index)?
            .slashed
            .record(slot, slashed)
    }

    /// Advances the frontier up to which the table is consistent.
    pub fn set_slot(&mut self, slot: Slot) {
        self.slot = self.slot.max(slot);
    }

    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.slot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Visits validators in ascending index order until the visitor returns
    /// `false`. References never escape the iteration.
    pub fn for_each(&self, mut visit: impl FnMut(ValidatorIndex, &StaticValidator) -> bool) {
        for (index, validator) in (0..).zip(&self.validators) {
            if !visit(index, validator) {
                break;
            }
        }
    }

    fn validator_mut(&mut self, validator_index: ValidatorIndex) -> Result<&mut StaticValidator> {
        let index = usize::try_from(validator_index)?;

        self.validators
            .get_mut(index)
            .ok_or(Error::Internal("validator index past the end of the table"))
            .map_err(Into::into)
    }
}
