use core::{
    num::NonZeroU64,
    ops::{Index as _, Rem as _},
};

use alloy_primitives::B256;
use anyhow::Result;
use bit_field::BitArray as _;
use itertools::izip;

const BITS_PER_HASH: usize = B256::len_bytes() * 8;

// The swap-or-not shuffle, originally based on:
// <https://github.com/protolambda/eth2-shuffle/tree/fd840f1036c1f8f6d7625ffe6ff4d9c60f942876>
// See the following for an explanation of the algorithm:
// - <https://github.com/protolambda/eth2-docs/tree/de65f38857f1e27ffb6f25107d61e795cf1a5ad7#shuffling>
//
// Rounds are applied in reverse so that the whole-slice and single-index
// variants are inverses of each other:
// `shuffled[i] == original[shuffle_single(i, n, seed, rounds)]`.
pub fn shuffle_slice<T>(slice: &mut [T], seed: B256, round_count: u8) -> Result<()> {
    let Some(length) = slice.len().try_into().map(NonZeroU64::new)? else {
        return Ok(());
    };

    for round in (0..round_count).rev() {
        let pivot = usize::try_from(compute_pivot(seed, round, length))
            .expect("remainder of division by number that fits in usize also fits in usize");

        let midpoint = pivot + 1;
        let (low, high) = slice.split_at_mut(midpoint);

        swap_around_mirror(seed, round, low, 0);
        swap_around_mirror(seed, round, high, midpoint);
    }

    Ok(())
}

fn swap_around_mirror<T>(seed: B256, round: u8, slice: &mut [T], offset: usize) {
    let mirror = slice.len() / 2;
    let offset_mirror = offset + mirror;
    let offset_length = offset + slice.len();
    let trailing = mirror.min(offset_length % BITS_PER_HASH);
    let leading = (mirror - trailing) % BITS_PER_HASH;

    let (low, mut high) = slice.split_at_mut(mirror);

    if low.len() < high.len() {
        high = &mut high[1..];
    }

    assert_eq!(low.len(), mirror);
    assert_eq!(high.len(), mirror);

    if trailing > 0 {
        let source = compute_source(seed, round, offset_length / BITS_PER_HASH);
        let bit_indices = (0..offset_length % BITS_PER_HASH).rev();
        let low_elements = low[..trailing].iter_mut();
        let high_elements = high[mirror - trailing..].iter_mut().rev();

        swap_using_source(source, bit_indices, low_elements, high_elements);
    }

    for (offset_chunk_index, low_chunk, high_chunk) in izip!(
        (0..offset_length / BITS_PER_HASH).rev(),
        low[trailing..].chunks_exact_mut(BITS_PER_HASH),
        high[..mirror - trailing].rchunks_exact_mut(BITS_PER_HASH),
    ) {
        let source = compute_source(seed, round, offset_chunk_index);
        let bit_indices = 0..BITS_PER_HASH;
        let low_elements = low_chunk.iter_mut().rev();
        let high_elements = high_chunk;

        swap_using_source(source, bit_indices, low_elements, high_elements);
    }

    if leading > 0 {
        let source = compute_source(seed, round, offset_mirror / BITS_PER_HASH);
        let bit_indices = (0..BITS_PER_HASH).rev();
        let low_elements = low[mirror - leading..].iter_mut();
        let high_elements = high[..leading].iter_mut().rev();

        swap_using_source(source, bit_indices, low_elements, high_elements);
    }
}

fn swap_using_source<'slice, T: 'slice>(
    source: B256,
    bit_indices: impl IntoIterator<Item = usize>,
    low: impl IntoIterator<Item = &'slice mut T>,
    high: impl IntoIterator<Item = &'slice mut T>,
) {
    for (bit_index, index, flip) in izip!(bit_indices, low, high) {
        let bit = source.as_slice().get_bit(bit_index);

        if bit {
            core::mem::swap(index, flip);
        }
    }
}

#[must_use]
pub fn shuffle_single(mut index: u64, index_count: NonZeroU64, seed: B256, round_count: u8) -> u64 {
    assert!(index < index_count.get());

    for round in 0..round_count {
        let pivot = compute_pivot(seed, round, index_count);
        let flip = (pivot + index_count.get() - index) % index_count;
        let position = index.max(flip);
        let source = compute_source(seed, round, position as usize / BITS_PER_HASH);
        let bit_index = position.to_le_bytes()[0].into();
        let bit = source.as_slice().get_bit(bit_index);

        if bit {
            index = flip;
        }
    }

    index
}

fn compute_pivot(seed: B256, round: u8, index_count: NonZeroU64) -> u64 {
    hashing::hash_256_8(seed, round)
        .index(..size_of::<u64>())
        .try_into()
        .map(u64::from_le_bytes)
        .expect("slice has the same size as u64")
        .rem(index_count)
}

fn compute_source(seed: B256, round: u8, position_window: usize) -> B256 {
    // Truncate to match the behavior of `compute_shuffled_index` in `consensus-specs`.
    #[allow(clippy::cast_possible_truncation)]
    hashing::hash_256_8_32(seed, round, position_window as u32)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use itertools::Itertools as _;

    use super::*;

    const ROUNDS: u8 = 90;

    fn seed() -> B256 {
        B256::from(hex!(
            "9c9adf1aa4e41038d6f07c3cd74f19300f30046879d3bd6158c820586f2b107b"
        ))
    }

    #[test]
    fn shuffled_slice_is_a_permutation_of_the_input() {
        for count in [0_u64, 1, 2, 33, 257, 1000] {
            let original = (0..count).collect_vec();
            let mut shuffled = original.clone();

            shuffle_slice(&mut shuffled, seed(), ROUNDS)
                .expect("length of the test slice fits in u64");

            let mut sorted = shuffled.clone();
            sorted.sort_unstable();

            assert_eq!(sorted, original, "count: {count}");
        }
    }

    #[test]
    fn single_index_variant_inverts_the_slice_variant() {
        let count = 421_u64;
        let original = (0..count).collect_vec();
        let mut shuffled = original.clone();

        shuffle_slice(&mut shuffled, seed(), ROUNDS)
            .expect("length of the test slice fits in u64");

        let index_count = NonZeroU64::new(count).expect("count is nonzero");

        for (position, element) in shuffled.iter().enumerate() {
            let source = shuffle_single(position as u64, index_count, seed(), ROUNDS);
            assert_eq!(*element, original[source as usize]);
        }
    }

    #[test]
    fn different_seeds_produce_different_permutations() {
        let mut first = (0..500_u64).collect_vec();
        let mut second = first.clone();

        shuffle_slice(&mut first, seed(), ROUNDS).expect("length fits in u64");
        shuffle_slice(&mut second, B256::ZERO, ROUNDS).expect("length fits in u64");

        assert_ne!(first, second);
    }
}
