//! Uniform random permutations.

use rand::Rng;

/// Return a shuffled copy of `items` using the thread-local RNG.
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(items, &mut rand::rng())
}

/// Return a shuffled copy of `items` drawing from `rng`.
///
/// Fisher-Yates over a copy: for `i` from `n - 1` down to `1`, swap element
/// `i` with a uniformly chosen `j` in `[0, i]`. The input is left untouched.
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();

    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }

    shuffled
}
