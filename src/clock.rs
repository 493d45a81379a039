//! Wall-clock time source
//!
//! All timings in the crate are `f64` seconds since an arbitrary, fixed,
//! process-wide epoch. Differences between two readings are what matter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// Monotonic time source in seconds
///
/// Implementations must never go backwards within a process.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the clock's epoch
    fn now(&self) -> f64;
}

/// Production clock backed by [`Instant`]
///
/// Source resolution is nanoseconds on every tier-1 platform; readings are
/// exposed as `f64` seconds, which keeps sub-microsecond precision for runs
/// far longer than any benchmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

impl MonotonicClock {
    /// Create a clock sharing the process-wide epoch
    #[must_use]
    pub fn new() -> Self {
        // Pin the epoch early so the first reading is not zero by accident.
        let _ = epoch();
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> f64 {
        epoch().elapsed().as_secs_f64()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Deterministic clock that advances a fixed step on every reading
///
/// Reading `n` (zero-based) returns `start + n * step`. Used to drive the
/// calibrator and runner without depending on the host timer.
#[derive(Debug)]
pub struct SteppingClock {
    start: f64,
    step: f64,
    reads: AtomicU64,
}

impl SteppingClock {
    /// Create a clock starting at `start` seconds, advancing `step` seconds per read
    #[must_use]
    pub fn new(start: f64, step: f64) -> Self {
        Self {
            start,
            step: step.max(0.0),
            reads: AtomicU64::new(0),
        }
    }

    /// Number of readings taken so far
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Clock for SteppingClock {
    #[allow(clippy::cast_precision_loss)]
    fn now(&self) -> f64 {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        self.start + self.step * n as f64
    }
}

/// Seconds elapsed while running `f`, measured with `clock`
pub fn time_region<C: Clock + ?Sized, F: FnOnce()>(clock: &C, f: F) -> f64 {
    let start = clock.now();
    f();
    clock.now() - start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..10_000 {
            let current = clock.now();
            assert!(current >= previous, "clock went backwards");
            previous = current;
        }
    }

    #[test]
    fn test_clocks_share_epoch() {
        let first = MonotonicClock::new().now();
        let second = MonotonicClock::new().now();
        assert!(second >= first);
    }

    #[test]
    fn test_stepping_clock_advances_per_read() {
        let clock = SteppingClock::new(10.0, 0.5);
        assert_eq!(clock.now(), 10.0);
        assert_eq!(clock.now(), 10.5);
        assert_eq!(clock.now(), 11.0);
        assert_eq!(clock.reads(), 3);
    }

    #[test]
    fn test_time_region_with_stepping_clock() {
        let clock = SteppingClock::new(0.0, 0.25);
        let elapsed = time_region(&clock, || {});
        assert_eq!(elapsed, 0.25);
    }

    #[test]
    fn test_time_region_is_non_negative() {
        let clock = MonotonicClock::new();
        let elapsed = time_region(&clock, || {
            std::hint::black_box((0..1000).sum::<u64>());
        });
        assert!(elapsed >= 0.0);
    }
}
