//! Weighted sampling without replacement ("roulette").
//!
//! Produces a full randomized permutation of a weighted candidate pool where
//! at every draw the probability of selecting a remaining item equals its
//! weight divided by the sum of remaining weights. This is *not* a pre-sorted
//! list: each draw re-spins over what is left.
//!
//! The wheel is an iterator, so callers that only need the first accepted
//! candidate stop early and never pay for the rest of the permutation.

use rand::Rng;

/// A lazily drawn weight-proportional permutation.
pub struct Roulette<'r, T, R: Rng> {
    pool: Vec<(f64, T)>,
    rng: &'r mut R,
}

impl<'r, T, R: Rng> Roulette<'r, T, R> {
    /// Negative and NaN weights are treated as zero; an empty pool yields an
    /// empty permutation.
    pub fn new(pool: Vec<(f64, T)>, rng: &'r mut R) -> Self {
        Roulette { pool, rng }
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }
}

fn effective(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 { weight } else { 0.0 }
}

impl<T, R: Rng> Iterator for Roulette<'_, T, R> {
    type Item = (f64, T);

    fn next(&mut self) -> Option<(f64, T)> {
        if self.pool.is_empty() {
            return None;
        }

        let total: f64 = self.pool.iter().map(|(weight, _)| effective(*weight)).sum();
        if total <= 0.0 {
            // Nothing left carries weight; drain in pool order.
            return Some(self.pool.remove(0));
        }

        let mut spin = self.rng.gen_range(0.0..total);
        for idx in 0..self.pool.len() {
            spin -= effective(self.pool[idx].0);
            if spin < 0.0 {
                return Some(self.pool.remove(idx));
            }
        }
        // Floating-point slack: the spin ran off the end of the wheel.
        self.pool.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_pool_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wheel = Roulette::<u8, _>::new(Vec::new(), &mut rng);
        assert!(wheel.next().is_none());
    }

    #[test]
    fn single_positive_weight_always_comes_first() {
        // Deterministic regardless of the seed: every other weight is zero.
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pool = vec![(0.0, "a"), (0.0, "b"), (0.0, "c"), (7.5, "winner")];
            let first = Roulette::new(pool, &mut rng).next().unwrap();
            assert_eq!(first.1, "winner");
        }
    }

    #[test]
    fn permutation_is_complete_and_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = vec![(1.0, 0usize), (2.0, 1), (3.0, 2), (4.0, 3)];
        let drawn: Vec<usize> = Roulette::new(pool, &mut rng).map(|(_, item)| item).collect();
        let mut sorted = drawn.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn all_zero_weights_still_drain_the_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        let pool = vec![(0.0, "a"), (0.0, "b")];
        let drawn: Vec<&str> = Roulette::new(pool, &mut rng).map(|(_, item)| item).collect();
        assert_eq!(drawn, vec!["a", "b"]);
    }

    #[test]
    fn heavier_items_come_up_first_more_often() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut heavy_first = 0;
        for _ in 0..500 {
            let pool = vec![(1.0, "light"), (9.0, "heavy")];
            let first = Roulette::new(pool, &mut rng).next().unwrap();
            if first.1 == "heavy" {
                heavy_first += 1;
            }
        }
        // Expected ~450 of 500; far enough from a fair coin to never flake.
        assert!(heavy_first > 350, "heavy item led only {heavy_first}/500 draws");
    }

    #[test]
    fn negative_and_nan_weights_count_as_zero() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pool = vec![(-5.0, "neg"), (f64::NAN, "nan"), (1.0, "real")];
            let first = Roulette::new(pool, &mut rng).next().unwrap();
            assert_eq!(first.1, "real");
        }
    }
}
