use hex_literal::hex;
use ssz_types::typenum::U4;

use crate::phase0::primitives::{DomainType, Epoch, Slot};

pub const GENESIS_SLOT: Slot = 0;
pub const GENESIS_EPOCH: Epoch = 0;
pub const FAR_FUTURE_EPOCH: Epoch = u64::MAX;

pub const DOMAIN_BEACON_ATTESTER: DomainType = DomainType::new(hex!("01000000"));

pub type JustificationBitsLength = U4;
