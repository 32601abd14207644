use comet_core::errors::ErrorInfo;
use comet_core::{CometError, RngHandle};
use tracing::debug;

/// Process-wide scoring state: the log-factorial table and the engine PRNG.
///
/// Acquire it once before the first chain runs and release it after the last
/// round. `release` consumes the context, so it cannot be released twice.
#[derive(Debug)]
pub struct ComputationContext {
    ln_factorials: Vec<f64>,
    rng: RngHandle,
    seed: u64,
}

impl ComputationContext {
    /// Precomputes `ln(i!)` for `i` in `0..=max_count` and seeds the PRNG.
    pub fn acquire(max_count: usize, seed: u64) -> Self {
        let mut ln_factorials = Vec::with_capacity(max_count + 1);
        ln_factorials.push(0.0);
        for i in 1..=max_count {
            let previous = ln_factorials[i - 1];
            ln_factorials.push(previous + (i as f64).ln());
        }
        debug!(max_count, seed, "acquired computation context");
        Self {
            ln_factorials,
            rng: RngHandle::from_seed(seed),
            seed,
        }
    }

    /// Reseeds the engine PRNG.
    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng = RngHandle::from_seed(seed);
        self.seed = seed;
    }

    /// Seed most recently installed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Largest argument covered by the factorial table.
    pub fn max_count(&self) -> usize {
        self.ln_factorials.len() - 1
    }

    /// Returns `ln(n!)`.
    pub fn ln_factorial(&self, n: usize) -> Result<f64, CometError> {
        self.ln_factorials.get(n).copied().ok_or_else(|| {
            CometError::Engine(
                ErrorInfo::new("factorial-range", "factorial table too small")
                    .with_context("requested", n.to_string())
                    .with_context("max_count", self.max_count().to_string()),
            )
        })
    }

    /// Returns `ln(n choose k)`; `k > n` yields negative infinity.
    pub fn ln_choose(&self, n: usize, k: usize) -> Result<f64, CometError> {
        if k > n {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(self.ln_factorial(n)? - self.ln_factorial(k)? - self.ln_factorial(n - k)?)
    }

    /// Mutable access to the engine PRNG.
    pub fn rng_mut(&mut self) -> &mut RngHandle {
        &mut self.rng
    }

    /// Frees the context.
    pub fn release(self) {
        debug!(max_count = self.max_count(), "released computation context");
    }
}
