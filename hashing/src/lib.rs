use alloy_primitives::B256;
use sha2::{Digest as _, Sha256};

// All integers are hashed little-endian, matching `consensus-specs`.

#[inline]
#[must_use]
pub fn hash_256_8(a: B256, b: u8) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(a);
    hasher.update([b]);
    B256::new(hasher.finalize().into())
}

#[inline]
#[must_use]
pub fn hash_256_8_32(a: B256, b: u8, c: u32) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(a);
    hasher.update([b]);
    hasher.update(c.to_le_bytes());
    B256::new(hasher.finalize().into())
}

#[inline]
#[must_use]
pub fn hash_32_64_256(a: [u8; 4], b: u64, c: B256) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(a);
    hasher.update(b.to_le_bytes());
    hasher.update(c);
    B256::new(hasher.finalize().into())
}
