//! Per-trial timing table and its reduction to best/average/worst figures
//!
//! ## Policy
//!
//! - Trial 0 is a warm-up and never enters any statistic
//! - Min, average and max are taken over trials `1..ntimes`
//! - Bandwidth uses the *minimum* time (best of N)
//!
//! ## Units
//!
//! Bandwidth is computed as `bytes / 2^20 / seconds`, i.e. MiB/s, and is
//! labelled "MB/s" in reports. The arithmetic is kept as-is so figures stay
//! comparable with historical STREAM results.

#![allow(clippy::cast_precision_loss)] // usize -> f64 for byte counts

use serde::{Deserialize, Serialize};

use crate::config::MIN_NTIMES;
use crate::error::{CaudalError, Result};
use crate::kernel::Kernel;

/// Divisor turning bytes into the reported bandwidth unit
pub const BYTES_PER_REPORTED_MB: f64 = 1024.0 * 1024.0;

// ============================================================================
// TrialTimings
// ============================================================================

/// Elapsed seconds per kernel per trial
///
/// Deserialization goes through [`TrialTimings::from_rows`], so a table read
/// back from JSON holds the same guarantees as one built in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimings")]
pub struct TrialTimings {
    rows: [Vec<f64>; 4],
}

/// Unchecked wire form of [`TrialTimings`]
#[derive(Deserialize)]
struct RawTimings {
    rows: [Vec<f64>; 4],
}

impl TryFrom<RawTimings> for TrialTimings {
    type Error = CaudalError;

    fn try_from(raw: RawTimings) -> Result<Self> {
        Self::from_rows(raw.rows)
    }
}

impl TrialTimings {
    /// Zeroed table for `ntimes` trials
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `ntimes < 2`.
    pub fn new(ntimes: usize) -> Result<Self> {
        check_ntimes(ntimes)?;
        Ok(Self {
            rows: std::array::from_fn(|_| vec![0.0; ntimes]),
        })
    }

    /// Build from complete rows in [`Kernel::ALL`] order
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if rows differ in length or hold fewer
    /// than two trials.
    pub fn from_rows(rows: [Vec<f64>; 4]) -> Result<Self> {
        let ntimes = rows[0].len();
        check_ntimes(ntimes)?;
        if rows.iter().any(|row| row.len() != ntimes) {
            return Err(CaudalError::InvalidConfiguration(
                "timing rows must all have the same trial count".to_string(),
            ));
        }
        Ok(Self { rows })
    }

    /// Number of trials
    #[must_use]
    pub fn ntimes(&self) -> usize {
        self.rows[0].len()
    }

    /// Store the elapsed time of `kernel` in `trial`
    ///
    /// # Panics
    ///
    /// Panics if `trial >= ntimes`.
    pub fn record(&mut self, kernel: Kernel, trial: usize, seconds: f64) {
        self.rows[kernel.index()][trial] = seconds;
    }

    /// Elapsed time of `kernel` in `trial`
    #[must_use]
    pub fn get(&self, kernel: Kernel, trial: usize) -> Option<f64> {
        self.rows[kernel.index()].get(trial).copied()
    }

    /// All trials for `kernel`, warm-up included
    #[must_use]
    pub fn row(&self, kernel: Kernel) -> &[f64] {
        &self.rows[kernel.index()]
    }

    /// Trials that count toward statistics (warm-up excluded)
    #[must_use]
    pub fn measured(&self, kernel: Kernel) -> &[f64] {
        &self.rows[kernel.index()][1..]
    }
}

fn check_ntimes(ntimes: usize) -> Result<()> {
    if ntimes < MIN_NTIMES {
        return Err(CaudalError::InvalidConfiguration(format!(
            "at least {MIN_NTIMES} trials are required, got {ntimes}"
        )));
    }
    Ok(())
}

// ============================================================================
// Traffic accounting
// ============================================================================

/// Shape of the data each kernel sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traffic {
    /// Bytes per element
    pub element_bytes: usize,
    /// Elements per unit
    pub partition: usize,
    /// Number of units
    pub units: usize,
}

impl Traffic {
    /// Bytes one pass of `kernel` moves across all units
    #[must_use]
    pub fn bytes(&self, kernel: Kernel) -> usize {
        kernel.bytes_moved(self.element_bytes, self.partition, self.units)
    }
}

/// Bandwidth in reported "MB/s" (MiB/s arithmetic)
#[must_use]
pub fn bandwidth_mb_s(bytes: usize, seconds: f64) -> f64 {
    bytes as f64 / BYTES_PER_REPORTED_MB / seconds
}

// ============================================================================
// Reduction
// ============================================================================

/// Reduced figures for one kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelStats {
    /// Which kernel
    pub kernel: Kernel,
    /// Bandwidth from the best time, "MB/s" (MiB/s arithmetic)
    pub bandwidth_mb_s: f64,
    /// Average over measured trials, seconds
    pub avg_time: f64,
    /// Best measured trial, seconds
    pub min_time: f64,
    /// Worst measured trial, seconds
    pub max_time: f64,
    /// Bytes moved per pass
    pub bytes: usize,
    /// Number of trials reduced (`ntimes - 1`)
    pub samples: usize,
}

/// Reduced figures for all four kernels, in [`Kernel::ALL`] order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedStats {
    /// One entry per kernel
    pub kernels: Vec<KernelStats>,
}

impl ReducedStats {
    /// Stats for one kernel
    #[must_use]
    pub fn get(&self, kernel: Kernel) -> Option<&KernelStats> {
        self.kernels.iter().find(|k| k.kernel == kernel)
    }
}

/// Reduce one kernel's row
///
/// Seeds min/sum/max from trial 1 and folds in the remaining trials; trial 0
/// is skipped.
#[must_use]
pub fn reduce_kernel(timings: &TrialTimings, kernel: Kernel, traffic: &Traffic) -> KernelStats {
    let measured = timings.measured(kernel);
    let first = measured[0];
    let (min, max, sum) = measured[1..]
        .iter()
        .fold((first, first, first), |(min, max, sum), &t| {
            (min.min(t), max.max(t), sum + t)
        });
    let bytes = traffic.bytes(kernel);

    KernelStats {
        kernel,
        bandwidth_mb_s: bandwidth_mb_s(bytes, min),
        avg_time: sum / (timings.ntimes() - 1) as f64,
        min_time: min,
        max_time: max,
        bytes,
        samples: measured.len(),
    }
}

/// Reduce the whole table
#[must_use]
pub fn reduce(timings: &TrialTimings, traffic: &Traffic) -> ReducedStats {
    ReducedStats {
        kernels: Kernel::ALL
            .iter()
            .map(|&kernel| reduce_kernel(timings, kernel, traffic))
            .collect(),
    }
}
