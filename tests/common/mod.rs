//! Shared networks and helpers for the integration tests

#![allow(dead_code)]

use lanesort::{Network, Permutation};

/// Batcher odd-even merge sort over six lanes, highest lane first
pub const BATCHER_6: [[usize; 6]; 6] = [
    [4, 5, 2, 3, 0, 1],
    [5, 4, 1, 0, 3, 2],
    [5, 4, 3, 1, 2, 0],
    [1, 0, 3, 2, 5, 4],
    [3, 2, 5, 4, 1, 0],
    [5, 3, 4, 1, 2, 0],
];

/// Lanes keeping the minimum in each stage of [`BATCHER_6`]
pub const BATCHER_6_MASKS: [u64; 6] = [0x15, 0x3, 0x2, 0x3, 0xc, 0xa];

pub const BITONIC_8: [[usize; 8]; 6] = [
    [6, 7, 4, 5, 2, 3, 0, 1],
    [4, 5, 6, 7, 0, 1, 2, 3],
    [6, 7, 4, 5, 2, 3, 0, 1],
    [0, 1, 2, 3, 4, 5, 6, 7],
    [5, 4, 7, 6, 1, 0, 3, 2],
    [6, 7, 4, 5, 2, 3, 0, 1],
];

pub const BITONIC_8_MASKS: [u64; 6] = [0x55, 0x33, 0x55, 0x0f, 0x33, 0x55];

pub const BITONIC_16: [[usize; 16]; 10] = [
    [14, 15, 12, 13, 10, 11, 8, 9, 6, 7, 4, 5, 2, 3, 0, 1],
    [12, 13, 14, 15, 8, 9, 10, 11, 4, 5, 6, 7, 0, 1, 2, 3],
    [14, 15, 12, 13, 10, 11, 8, 9, 6, 7, 4, 5, 2, 3, 0, 1],
    [8, 9, 10, 11, 12, 13, 14, 15, 0, 1, 2, 3, 4, 5, 6, 7],
    [13, 12, 15, 14, 9, 8, 11, 10, 5, 4, 7, 6, 1, 0, 3, 2],
    [14, 15, 12, 13, 10, 11, 8, 9, 6, 7, 4, 5, 2, 3, 0, 1],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [11, 10, 9, 8, 15, 14, 13, 12, 3, 2, 1, 0, 7, 6, 5, 4],
    [13, 12, 15, 14, 9, 8, 11, 10, 5, 4, 7, 6, 1, 0, 3, 2],
    [14, 15, 12, 13, 10, 11, 8, 9, 6, 7, 4, 5, 2, 3, 0, 1],
];

pub const BITONIC_16_MASKS: [u64; 10] = [
    0x5555, 0x3333, 0x5555, 0x0f0f, 0x3333, 0x5555, 0x00ff, 0x0f0f, 0x3333, 0x5555,
];

pub fn fixture<const N: usize>(stages: &[[usize; N]]) -> Network {
    let stages = stages
        .iter()
        .map(|stage| Permutation::new(stage.to_vec()).unwrap())
        .collect();
    Network::new(N, stages).unwrap()
}

/// Bitonic sorting network over `size` lanes
///
/// Built for the next power of two with every merge starting in reversed
/// order, so each comparator puts its minimum in the lower lane. Comparators
/// that touch a lane at or beyond `size` are dropped, which keeps the
/// network sorting.
pub fn bitonic_network(size: usize) -> Network {
    let full = size.next_power_of_two();
    let mut layers: Vec<Vec<(usize, usize)>> = Vec::new();

    let mut k = 2;
    while k <= full {
        layers.push(comparators(full, k - 1));
        let mut j = k / 4;
        while j >= 1 {
            layers.push(comparators(full, j));
            j /= 2;
        }
        k *= 2;
    }

    let stages = layers
        .into_iter()
        .map(|layer| {
            let mut partners: Vec<usize> = (0..size).collect();
            for (lo, hi) in layer.into_iter().filter(|&(_, hi)| hi < size) {
                partners[lo] = hi;
                partners[hi] = lo;
            }
            partners
        })
        .filter(|partners| partners.iter().enumerate().any(|(lane, &p)| lane != p))
        .map(|partners| Permutation::from_partners(&partners, size).unwrap())
        .collect();
    Network::new(size, stages).unwrap()
}

/// Comparators `(i, i ^ xor)` with `i` the lower lane
fn comparators(lanes: usize, xor: usize) -> Vec<(usize, usize)> {
    (0..lanes)
        .filter(|&i| (i ^ xor) > i)
        .map(|i| (i, i ^ xor))
        .collect()
}

/// Largest number of `element_bytes`-wide lanes the tier's registers hold
pub fn max_lanes(tier: lanesort::Tier, element_bytes: usize) -> usize {
    let register = match tier {
        lanesort::Tier::Sse4 => 16,
        lanesort::Tier::Avx2 => 32,
        lanesort::Tier::Avx512 => 64,
    };
    register / element_bytes
}

pub fn is_sorted<T: Ord>(values: &[T]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}
