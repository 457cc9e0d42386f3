//! Fixed-width slot keys and the compressed uint64-list diff format.
//!
//! Diff blobs are zstd frames. The decompressed payload is a little-endian
//! `u64` byte length of the post-diff list followed by replacement records,
//! each `u32_be(offset) || u32_be(length) || bytes[length]` with offsets and
//! lengths in bytes. Offsets and lengths must stay aligned to the 8-byte
//! elements of the list.

use std::io::Read;

use anyhow::{bail, ensure, Result};

use crate::error::Error;
use types::phase0::primitives::Slot;

pub const SLOT_KEY_LENGTH: usize = size_of::<u32>();

/// Keys are the low 32 bits of the slot, big-endian, so that cursor seeks by
/// prefix yield entries in slot order.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_slot_key(slot: Slot) -> [u8; SLOT_KEY_LENGTH] {
    (slot as u32).to_be_bytes()
}

pub fn decode_slot_key(bytes: &[u8]) -> Result<Slot> {
    let array: [u8; SLOT_KEY_LENGTH] = bytes.try_into().map_err(|_| Error::DecodeFailure {
        context: "slot key",
        details: format!("expected {SLOT_KEY_LENGTH} bytes, got {}", bytes.len()),
    })?;

    Ok(u32::from_be_bytes(array).into())
}

/// Applies a compressed diff to a uint64 list in place.
///
/// The buffer is resized to the length the diff declares; growth is
/// zero-filled. The diff never reads from the base, so aliasing the working
/// buffer across chained applications is sound.
pub fn apply_uint64_list_diff(
    buffer: &mut Vec<u8>,
    slot: Slot,
    compressed_diff: &[u8],
) -> Result<()> {
    let diff = zstd::decode_all(compressed_diff).map_err(|_| Error::CorruptDiff {
        slot,
        reason: "diff blob is not a valid zstd frame",
    })?;

    let corrupt = |reason| Error::CorruptDiff { slot, reason };

    let (length_bytes, mut records) = diff
        .split_at_checked(size_of::<u64>())
        .ok_or(corrupt("diff shorter than its length header"))?;

    let new_length = usize::try_from(u64::from_le_bytes(
        length_bytes.try_into().expect("split yields 8 bytes"),
    ))?;

    ensure!(
        new_length % size_of::<u64>() == 0,
        corrupt("list length not aligned to 8-byte elements"),
    );

    buffer.resize(new_length, 0);

    while !records.is_empty() {
        let (header, rest) = records
            .split_at_checked(2 * size_of::<u32>())
            .ok_or(corrupt("truncated record header"))?;

        let offset = usize::try_from(u32::from_be_bytes(
            header[..4].try_into().expect("split yields 8 bytes"),
        ))?;
        let length = usize::try_from(u32::from_be_bytes(
            header[4..].try_into().expect("split yields 8 bytes"),
        ))?;

        ensure!(
            offset % size_of::<u64>() == 0 && length % size_of::<u64>() == 0,
            corrupt("record not aligned to 8-byte elements"),
        );

        let Some(end) = offset.checked_add(length).filter(|end| *end <= new_length) else {
            bail!(corrupt("record exceeds list bounds"));
        };

        let (replacement, rest) = rest
            .split_at_checked(length)
            .ok_or(corrupt("truncated record payload"))?;

        buffer[offset..end].copy_from_slice(replacement);
        records = rest;
    }

    Ok(())
}

/// Reads up to `buffer.len()` decompressed bytes, returning how many were
/// available. A frame that ends early leaves the tail untouched; the caller
/// decides whether that is acceptable.
pub fn read_zstd(reader: &mut impl Read, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;

    while filled < buffer.len() {
        let count = reader.read(&mut buffer[filled..])?;

        if count == 0 {
            break;
        }

        filled += count;
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress_diff(new_length: u64, records: &[(u32, &[u8])]) -> Vec<u8> {
        let mut payload = new_length.to_le_bytes().to_vec();

        for (offset, bytes) in records {
            payload.extend_from_slice(&offset.to_be_bytes());
            payload.extend_from_slice(&u32::try_from(bytes.len()).unwrap().to_be_bytes());
            payload.extend_from_slice(bytes);
        }

        zstd::encode_all(payload.as_slice(), 0).expect("compressing a test diff never fails")
    }

    #[test]
    fn slot_keys_round_trip_and_preserve_order() -> Result<()> {
        for slot in [0_u64, 1, 2048, 2080, u64::from(u32::MAX)] {
            assert_eq!(decode_slot_key(&encode_slot_key(slot))?, slot);
        }

        assert!(encode_slot_key(2048) < encode_slot_key(2049));
        assert!(encode_slot_key(255) < encode_slot_key(256));

        Ok(())
    }

    #[test]
    fn decoding_a_key_of_the_wrong_width_fails() {
        decode_slot_key(&[0, 0, 1]).expect_err("3-byte keys are invalid");
    }

    #[test]
    fn empty_diff_is_identity() -> Result<()> {
        let original = 17_u64
            .to_le_bytes()
            .into_iter()
            .chain(19_u64.to_le_bytes())
            .collect::<Vec<_>>();

        let mut buffer = original.clone();
        apply_uint64_list_diff(&mut buffer, 0, &compress_diff(16, &[]))?;

        assert_eq!(buffer, original);

        Ok(())
    }

    #[test]
    fn diff_replaces_elements_and_grows_the_list() -> Result<()> {
        let mut buffer = vec![0; 16];

        let replacement = 23_u64.to_le_bytes();
        apply_uint64_list_diff(&mut buffer, 0, &compress_diff(24, &[(16, &replacement)]))?;

        assert_eq!(buffer.len(), 24);
        assert_eq!(&buffer[16..], replacement);
        assert_eq!(&buffer[..16], [0; 16]);

        Ok(())
    }

    #[test]
    fn misaligned_records_are_rejected() {
        let mut buffer = vec![0; 16];
        let replacement = [0; 8];

        apply_uint64_list_diff(&mut buffer, 5, &compress_diff(16, &[(4, &replacement)]))
            .expect_err("offset 4 is not aligned to 8-byte elements");
    }

    #[test]
    fn out_of_bounds_records_are_rejected() {
        let mut buffer = vec![0; 16];
        let replacement = [0; 8];

        apply_uint64_list_diff(&mut buffer, 5, &compress_diff(16, &[(16, &replacement)]))
            .expect_err("record ends past the declared list length");
    }

    #[test]
    fn read_zstd_reports_short_frames() -> Result<()> {
        let compressed = zstd::encode_all([1_u8, 2, 3].as_slice(), 0)?;
        let mut decoder = zstd::Decoder::new(compressed.as_slice())?;
        let mut buffer = [0; 8];

        assert_eq!(read_zstd(&mut decoder, &mut buffer)?, 3);
        assert_eq!(&buffer[..3], [1, 2, 3]);

        Ok(())
    }
}
