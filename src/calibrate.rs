//! Clock granularity calibration
//!
//! Collects a short sequence of distinct clock readings and takes the smallest
//! gap between neighbours as the tick size. The result only feeds the
//! "is each test long enough" guidance; it never fails a run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;

/// Number of distinct timestamps collected during calibration
pub const CALIBRATION_SAMPLES: usize = 20;

/// Initial minimum before any delta is folded in (one second, in µs)
const MAX_DELTA_US: i64 = 1_000_000;

/// Minimum advance between two collected readings (one microsecond)
const MIN_ADVANCE_S: f64 = 1.0e-6;

/// Estimated clock granularity in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Granularity {
    /// Smallest observed delta, clamped at zero
    pub raw_us: u64,
    /// Value used for threshold comparisons (`raw_us`, floored at 1)
    pub effective_us: u64,
}

impl Granularity {
    /// Build from a raw measurement, substituting 1 for sub-microsecond clocks
    #[must_use]
    pub fn from_raw(raw_us: u64) -> Self {
        Self {
            raw_us,
            effective_us: raw_us.max(1),
        }
    }

    /// Whether the clock resolves better than one microsecond
    #[must_use]
    pub fn is_sub_microsecond(&self) -> bool {
        self.raw_us == 0
    }
}

/// Collect `samples` timestamps, each at least one microsecond after the reading
/// that started its wait
///
/// Spins on the clock; a clock that never advances never returns.
pub fn collect_timestamps<C: Clock + ?Sized>(clock: &C, samples: usize) -> Vec<f64> {
    let mut found = Vec::with_capacity(samples);
    for _ in 0..samples {
        let t1 = clock.now();
        let mut t2 = clock.now();
        while t2 - t1 < MIN_ADVANCE_S {
            t2 = clock.now();
        }
        found.push(t2);
    }
    found
}

/// Smallest gap between consecutive timestamps in whole microseconds
///
/// Each gap is truncated toward zero and clamped at zero before the minimum
/// is taken. Fewer than two timestamps yield the one-second ceiling.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn min_delta_us(timestamps: &[f64]) -> u64 {
    let min = timestamps
        .windows(2)
        .map(|pair| ((1.0e6 * (pair[1] - pair[0])) as i64).max(0))
        .fold(MAX_DELTA_US, i64::min);
    min as u64
}

/// Estimate the clock granularity
#[must_use]
pub fn check_tick<C: Clock + ?Sized>(clock: &C) -> Granularity {
    let timestamps = collect_timestamps(clock, CALIBRATION_SAMPLES);
    let granularity = Granularity::from_raw(min_delta_us(&timestamps));
    debug!(
        raw_us = granularity.raw_us,
        effective_us = granularity.effective_us,
        "clock calibrated"
    );
    granularity
}
