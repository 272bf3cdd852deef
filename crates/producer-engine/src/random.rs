//! Entropy source for partition draws and delay jitter.

use rand::Rng;

/// Source of uniform integer draws.
///
/// Every [`rand::Rng`] is a `RandomSource`; tests implement it directly to
/// script exact draws.
pub trait RandomSource {
    /// Uniform integer in `[0, upper)`. `upper` must be non-zero.
    fn draw_below(&mut self, upper: u64) -> u64;
}

impl<R: Rng> RandomSource for R {
    fn draw_below(&mut self, upper: u64) -> u64 {
        self.random_range(0..upper)
    }
}
