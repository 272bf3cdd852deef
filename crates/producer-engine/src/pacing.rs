//! Pause between consecutive sends.

use crate::random::RandomSource;
use std::time::Duration;

/// Delay applied after every send.
///
/// A non-zero `random_bound` wins over `fixed`: the pause is then drawn
/// uniformly from `[0, random_bound)` at millisecond granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    pub fixed: Duration,
    pub random_bound: Duration,
}

impl Pacing {
    pub fn from_millis(fixed_ms: u64, random_bound_ms: u64) -> Self {
        Self {
            fixed: Duration::from_millis(fixed_ms),
            random_bound: Duration::from_millis(random_bound_ms),
        }
    }

    /// Pause to apply after the current send, `None` for no pause.
    pub fn next_pause<R: RandomSource + ?Sized>(&self, entropy: &mut R) -> Option<Duration> {
        let bound_ms = self.random_bound.as_millis() as u64;
        if bound_ms > 0 {
            return Some(Duration::from_millis(entropy.draw_below(bound_ms)));
        }
        if !self.fixed.is_zero() {
            return Some(self.fixed);
        }
        None
    }

    /// Sleep for the next pause and return what was applied.
    pub async fn pause<R: RandomSource + ?Sized>(&self, entropy: &mut R) -> Option<Duration> {
        let pause = self.next_pause(entropy)?;
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        Some(pause)
    }
}
