//! Seeded randomness for the sampler and the initial-solution planner.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;

/// Seeded `StdRng` with the draws the sampler needs.
///
/// Independent consumers take a substream of the master seed (see
/// [`derive_substream_seed`]) so adding draws in one place never shifts the
/// sequence seen by another.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Seeds a handle directly.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Handle for substream `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Uniform index in `0..bound`. `bound` must be positive.
    pub fn below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision.
    pub fn next_unit(&mut self) -> f64 {
        (self.rng.gen::<u64>() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Raw 64-bit draw.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// `amount` distinct indices from `0..len` in random order.
    pub fn distinct_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

/// Seed of substream `substream`: SipHash-1-3 with zero keys over
/// `(master_seed, substream)`, stable across platforms and releases.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
