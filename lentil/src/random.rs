//! Random number source for the sampler.
//!
//! The sampler owns its generator and never touches a thread-local one;
//! a seed determines the whole chain. [`Lcg64`] is the default generator.
//! Tests substitute stubs that implement [`RandomSource::uniform`] only.

use rand::{RngCore, SeedableRng};

/// Draws used by the Gibbs sweeps.
pub trait RandomSource {
    /// Uniform real in `[0, 1)`
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `0..n` (`n > 0`)
    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        ((self.uniform() * n as f64) as usize).min(n - 1)
    }

    /// In-place Fisher-Yates shuffle
    fn shuffle<T>(&mut self, xs: &mut [T]) {
        for i in (1..xs.len()).rev() {
            let j = self.below(i + 1);
            xs.swap(i, j);
        }
    }

    /// Draw `i` with probability proportional to `weights[i]`.
    ///
    /// Fills `cumulative` with the running sums, draws a single threshold
    /// `uniform() * total` and returns the first index whose cumulative
    /// sum reaches it. If nothing qualifies (e.g. all mass underflowed) the
    /// last index is returned.
    ///
    /// * `weights` - non-negative, unnormalized
    /// * `cumulative` - scratch buffer, overwritten
    fn sample_categorical(&mut self, weights: &[f64], cumulative: &mut Vec<f64>) -> usize {
        debug_assert!(!weights.is_empty());
        cumulative.clear();
        let mut cum = 0.0;
        for &w in weights {
            cum += w;
            cumulative.push(cum);
        }

        let threshold = self.uniform() * cum;
        cumulative
            .iter()
            .position(|&c| c >= threshold)
            .unwrap_or(weights.len() - 1)
    }
}

const LCG_MULTIPLIER: u64 = 18145460002477866997;
const LCG_INCREMENT: u64 = 1;

/// 64-bit linear congruential generator,
/// `x <- x * 18145460002477866997 + 1 (mod 2^64)`.
///
/// Not cryptographic. The low bits have short periods; draw from the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    /// Start from state `seed`
    pub fn new(seed: u64) -> Self {
        Lcg64 { state: seed }
    }

    #[inline]
    fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }
}

impl RngCore for Lcg64 {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Lcg64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Lcg64::new(u64::from_le_bytes(seed))
    }

    /// The seed is the initial state, without scrambling.
    fn seed_from_u64(state: u64) -> Self {
        Lcg64::new(state)
    }
}

impl RandomSource for Lcg64 {
    /// Top 53 bits of the next state, scaled into `[0, 1)`
    fn uniform(&mut self) -> f64 {
        (self.step() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Always draws the middle of the unit interval.
    struct Midpoint;

    impl RandomSource for Midpoint {
        fn uniform(&mut self) -> f64 {
            0.5
        }
    }

    /// Replays a fixed list of uniforms.
    struct Replay(Vec<f64>);

    impl RandomSource for Replay {
        fn uniform(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn test_categorical_midpoint() {
        // cumulative [1, 2, 4], threshold 2 -> first index reaching 2
        let mut cum = vec![];
        let idx = Midpoint.sample_categorical(&[1.0, 1.0, 2.0], &mut cum);
        assert_eq!(idx, 1);
        assert_eq!(cum, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_categorical_boundaries() {
        let mut cum = vec![];
        let mut rng = Replay(vec![0.0, 0.999_999, 0.3]);
        // zero-weight head is skipped only when threshold is strictly positive
        assert_eq!(rng.sample_categorical(&[0.0, 1.0, 1.0], &mut cum), 0);
        assert_eq!(rng.sample_categorical(&[1.0, 1.0, 1.0], &mut cum), 2);
        assert_eq!(rng.sample_categorical(&[0.0, 5.0, 0.0], &mut cum), 1);
    }

    #[test]
    fn test_categorical_degenerate_returns_last() {
        let mut cum = vec![];
        let idx = Midpoint.sample_categorical(&[f64::NAN, f64::NAN], &mut cum);
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_categorical_frequencies() {
        let mut rng = Lcg64::new(7);
        let weights = [1.0, 3.0, 0.0, 6.0];
        let mut counts = [0usize; 4];
        let mut cum = vec![];
        let n = 20_000;
        for _ in 0..n {
            counts[rng.sample_categorical(&weights, &mut cum)] += 1;
        }
        assert_eq!(counts[2], 0);
        for (k, &w) in weights.iter().enumerate() {
            let freq = counts[k] as f64 / n as f64;
            assert!((freq - w / 10.0).abs() < 0.02, "{:?}", counts);
        }
    }

    #[test]
    fn test_lcg_reproducible() {
        let mut a = Lcg64::new(42);
        let mut b = Lcg64::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        // first step from zero is the increment
        assert_eq!(Lcg64::new(0).next_u64(), 1);
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = Lcg64::new(1);
        for _ in 0..10_000 {
            let u = RandomSource::uniform(&mut rng);
            assert!((0.0..1.0).contains(&u));
        }
        // plugs into the rand ecosystem as well
        let x: f64 = rng.random();
        assert!((0.0..1.0).contains(&x));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Lcg64::new(3);
        let mut xs: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut xs);
        let mut sorted = xs.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(xs, sorted);
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        // the last element must be able to move (classic off-by-one)
        let mut rng = Lcg64::new(11);
        let mut seen_first = [false; 4];
        for _ in 0..400 {
            let mut xs = [0, 1, 2, 3];
            rng.shuffle(&mut xs);
            seen_first[xs[0]] = true;
        }
        assert!(seen_first.iter().all(|&s| s));
    }
}
