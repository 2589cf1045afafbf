#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn random_keys(n: usize, seed: u64) -> Vec<u32> {
    let mut rng = seeded_rng(seed);
    (0..n).map(|_| rng.gen()).collect()
}

/// Verify data is ascending.
pub fn verify_sorted(data: &[u32]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

/// Verify the same multiset of keys exists before and after sorting.
pub fn verify_permutation(orig: &[u32], sorted: &[u32]) -> bool {
    if orig.len() != sorted.len() {
        return false;
    }
    let mut a = orig.to_vec();
    let mut b = sorted.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Verify the same multiset of (key, payload) pairs exists before and after
/// sorting.
pub fn verify_pairs_preserved(
    orig_keys: &[u32],
    orig_vals: &[u32],
    sorted_keys: &[u32],
    sorted_vals: &[u32],
) -> bool {
    if orig_keys.len() != sorted_keys.len() || orig_vals.len() != sorted_vals.len() {
        return false;
    }
    let mut orig: Vec<(u32, u32)> = orig_keys.iter().copied().zip(orig_vals.iter().copied()).collect();
    let mut sorted: Vec<(u32, u32)> =
        sorted_keys.iter().copied().zip(sorted_vals.iter().copied()).collect();
    orig.sort_unstable();
    sorted.sort_unstable();
    orig == sorted
}

/// Reference stable sort of (key, payload) pairs by key.
pub fn stable_reference(keys: &[u32], vals: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let mut pairs: Vec<(u32, u32)> = keys.iter().copied().zip(vals.iter().copied()).collect();
    pairs.sort_by_key(|&(k, _)| k);
    pairs.into_iter().unzip()
}
