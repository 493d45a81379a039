//! Up-front timing estimate
//!
//! Before the trials start, one parallel pass of `a[i] = 2.0 * a[i]` is timed.
//! Its duration tells the user roughly how long each kernel will take, and is
//! compared against the clock granularity: a test shorter than about 100
//! ticks gives unreliable numbers and calls for bigger arrays.
//!
//! The pass leaves A doubled; the trials run on that state.

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calibrate::Granularity;
use crate::clock::{time_region, Clock};
use crate::element::StreamElement;
use crate::kernel::double;
use crate::workspace::Workspace;

/// Ticks a single test should span for trustworthy timings
pub const MIN_TICKS_PER_TEST: u64 = 100;

/// Result of the timing estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmupEstimate {
    /// Duration of the doubling pass, whole microseconds
    pub estimate_us: u64,
    /// Clock granularity used for the guidance
    pub granularity: Granularity,
}

impl WarmupEstimate {
    /// Build from a measured duration in seconds
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_seconds(seconds: f64, granularity: Granularity) -> Self {
        Self {
            estimate_us: (1.0e6 * seconds).max(0.0) as u64,
            granularity,
        }
    }

    /// Suggested minimum duration per test, microseconds
    #[must_use]
    pub fn recommended_min_us(&self) -> u64 {
        self.granularity.effective_us.saturating_mul(MIN_TICKS_PER_TEST)
    }

    /// Clock ticks covered by the estimated test duration
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.estimate_us / self.granularity.effective_us
    }

    /// Whether tests are long enough relative to the clock
    #[must_use]
    pub fn is_sufficient(&self) -> bool {
        self.estimate_us >= self.recommended_min_us()
    }
}

/// Time one parallel doubling pass over every unit's A array
pub fn estimate<T: StreamElement, C: Clock + ?Sized>(
    pool: &ThreadPool,
    clock: &C,
    workspace: &mut Workspace<T>,
    granularity: Granularity,
) -> WarmupEstimate {
    let seconds = time_region(clock, || {
        workspace.for_each_unit(pool, |unit| double(&mut unit.a));
    });
    let estimate = WarmupEstimate::from_seconds(seconds, granularity);
    debug!(estimate_us = estimate.estimate_us, ticks = estimate.ticks(), "timing estimate");
    if !estimate.is_sufficient() {
        warn!(
            estimate_us = estimate.estimate_us,
            recommended_us = estimate.recommended_min_us(),
            "tests are short relative to the clock granularity; consider more elements"
        );
    }
    estimate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;

    #[test]
    fn test_recommended_min_uses_effective_granularity() {
        let est = WarmupEstimate::from_seconds(1.0 / 1024.0, Granularity::from_raw(0));
        assert_eq!(est.recommended_min_us(), 100);
        assert_eq!(est.estimate_us, 976);
        assert!(est.is_sufficient());
    }

    #[test]
    fn test_insufficient_estimate() {
        let est = WarmupEstimate::from_seconds(0.000_050, Granularity::from_raw(2));
        assert_eq!(est.recommended_min_us(), 200);
        assert!(!est.is_sufficient());
        assert_eq!(est.ticks(), est.estimate_us / 2);
    }

    #[test]
    fn test_negative_duration_clamps_to_zero() {
        let est = WarmupEstimate::from_seconds(-1.0, Granularity::from_raw(1));
        assert_eq!(est.estimate_us, 0);
    }

    #[test]
    fn test_estimate_doubles_a() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap();
        let mut ws = Workspace::<f64>::new(&pool, 64, 2).unwrap();
        let clock = SteppingClock::new(0.0, 0.5);
        let est = estimate(&pool, &clock, &mut ws, Granularity::from_raw(1));
        assert_eq!(est.estimate_us, 500_000);
        assert!(ws.units().iter().all(|u| u.a.iter().all(|&x| x == 2.0)));
        assert!(ws.units().iter().all(|u| u.b.iter().all(|&x| x == 2.0)));
    }
}
