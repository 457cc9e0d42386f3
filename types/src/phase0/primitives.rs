pub use alloy_primitives::B256 as H256;

use alloy_primitives::{aliases::B32, Address, FixedBytes};

pub type Slot = u64;
pub type Epoch = u64;
pub type CommitteeIndex = u64;
pub type ValidatorIndex = u64;
pub type Gwei = u64;
pub type DepositIndex = u64;
pub type UnixSeconds = u64;

pub type Version = B32;
pub type DomainType = B32;

pub type ExecutionAddress = Address;
pub type ExecutionBlockHash = H256;
pub type ExecutionBlockNumber = u64;

// Public keys and signatures are carried as opaque bytes. The archive never
// verifies them; decompression is the consumer's concern.
pub type PublicKeyBytes = FixedBytes<48>;
pub type SignatureBytes = FixedBytes<96>;
pub type AggregateSignatureBytes = FixedBytes<96>;
