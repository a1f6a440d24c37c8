//! Held-out sample selection.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entity::Ratings;

/// Sample `count` distinct indices from `0..n` without replacement.
///
/// Returns fewer than `count` indices only when `n < count`.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    n: usize,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    if n == 0 || count == 0 {
        return Vec::new();
    }

    let count = count.min(n);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(count);
    indices
}

/// Split `ratings` into `(visible, held_out)` by withholding `count` entries
/// chosen uniformly at random.
///
/// Selection runs over the ratings in key order, so a fixed stream always
/// withholds the same entries.
pub fn partition_held_out<R: Rng + ?Sized>(
    mut ratings: Ratings,
    count: usize,
    rng: &mut R,
) -> (Ratings, Ratings) {
    let keys: Vec<String> = ratings.keys().cloned().collect();
    let mut held_out = Ratings::new();
    for idx in sample_without_replacement(keys.len(), count, rng) {
        let key = &keys[idx];
        if let Some(value) = ratings.remove(key) {
            held_out.insert(key.clone(), value);
        }
    }
    (ratings, held_out)
}
