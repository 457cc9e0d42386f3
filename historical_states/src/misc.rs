use types::{
    phase0::primitives::{Epoch, Slot},
    preset::Preset,
};

#[must_use]
pub fn compute_epoch_at_slot<P: Preset>(slot: Slot) -> Epoch {
    slot / P::SLOTS_PER_EPOCH
}

#[must_use]
pub const fn compute_start_slot_at_epoch<P: Preset>(epoch: Epoch) -> Slot {
    epoch.saturating_mul(P::SLOTS_PER_EPOCH.get())
}

#[must_use]
pub fn round_slot_to_epoch<P: Preset>(slot: Slot) -> Slot {
    slot - slot % P::SLOTS_PER_EPOCH
}

#[must_use]
pub fn round_slot_to_sync_committee_period<P: Preset>(slot: Slot) -> Slot {
    let slots_per_period =
        P::SLOTS_PER_EPOCH.get() * P::EPOCHS_PER_SYNC_COMMITTEE_PERIOD.get();
    slot - slot % slots_per_period
}

#[must_use]
pub fn round_slot_to_vote_period<P: Preset>(slot: Slot) -> Slot {
    let slots_per_period = P::SLOTS_PER_EPOCH.get() * P::EPOCHS_PER_ETH1_VOTING_PERIOD.get();
    slot - slot % slots_per_period
}

#[must_use]
pub const fn round_slot_to_dump(slot: Slot, slots_per_dump: u64) -> Slot {
    slot - slot % slots_per_dump
}

#[must_use]
pub fn committee_count_from_active_validator_count<P: Preset>(active_validator_count: u64) -> u64 {
    (active_validator_count / P::SLOTS_PER_EPOCH / P::TARGET_COMMITTEE_SIZE)
        .clamp(1, P::MAX_COMMITTEES_PER_SLOT.get())
}

#[cfg(test)]
mod tests {
    use types::preset::{Mainnet, Minimal};

    use super::*;

    #[test]
    fn test_epoch_at_slot() {
        assert_eq!(compute_epoch_at_slot::<Minimal>(7), 0);
        assert_eq!(compute_epoch_at_slot::<Minimal>(8), 1);
        assert_eq!(compute_epoch_at_slot::<Minimal>(9), 1);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_slot_to_epoch::<Mainnet>(2079), 2048);
        assert_eq!(round_slot_to_epoch::<Mainnet>(2080), 2080);
        assert_eq!(round_slot_to_vote_period::<Mainnet>(2080), 2048);
        assert_eq!(round_slot_to_sync_committee_period::<Mainnet>(8193), 8192);
    }

    #[test]
    fn committee_count_is_clamped() {
        assert_eq!(committee_count_from_active_validator_count::<Mainnet>(0), 1);
        assert_eq!(
            committee_count_from_active_validator_count::<Mainnet>(1 << 22),
            64,
        );
        assert_eq!(
            committee_count_from_active_validator_count::<Minimal>(64),
            2,
        );
    }
}
