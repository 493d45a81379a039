//! Benchmark harness
//!
//! Wires the pieces together for one run:
//!
//! 1. Build a worker pool with one thread per unit
//! 2. Allocate and initialize every unit's arrays inside the pool
//! 3. Calibrate the clock
//! 4. Time one doubling pass as an estimate
//! 5. Run `ntimes` trials of Copy, Scale, Add, Triad
//! 6. Reduce the timings
//!
//! The pool lives for the whole run and is reused by every phase.

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::calibrate::{check_tick, Granularity};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{Precision, RunConfig};
use crate::element::StreamElement;
use crate::error::Result;
use crate::runner::KernelRunner;
use crate::stats::{reduce, ReducedStats, Traffic, TrialTimings};
use crate::topology::{online_cpus, worker_placement, WorkerPlacement};
use crate::warmup::{self, WarmupEstimate};
use crate::workspace::{MemoryFootprint, Workspace};

/// Everything a run produces, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Configuration the run used
    pub config: RunConfig,
    /// Bytes per array element
    pub element_bytes: usize,
    /// CPUs online on the host
    pub online_cpus: usize,
    /// CPU each worker was on when probed
    pub placement: Vec<WorkerPlacement>,
    /// Elements per unit
    pub partition_size: usize,
    /// Requested elements left out by the even split
    pub dropped_elements: usize,
    /// Memory held by the arrays
    pub footprint: MemoryFootprint,
    /// Clock granularity
    pub granularity: Granularity,
    /// Doubling-pass estimate
    pub warmup: WarmupEstimate,
    /// Raw per-trial timings
    pub timings: TrialTimings,
    /// Reduced figures per kernel
    pub stats: ReducedStats,
}

/// A configured benchmark run
#[derive(Debug)]
pub struct StreamBenchmark<C: Clock = MonotonicClock> {
    config: RunConfig,
    clock: C,
}

impl StreamBenchmark<MonotonicClock> {
    /// Benchmark timed with the monotonic system clock
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> StreamBenchmark<C> {
    /// Benchmark timed with a custom clock
    ///
    /// Trial counts below two are replaced by the default.
    #[must_use]
    pub fn with_clock(config: RunConfig, clock: C) -> Self {
        Self {
            config: config.normalized(),
            clock,
        }
    }

    /// Configuration of this run
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the configuration does not validate
    /// - `ThreadPool` if the worker pool cannot be built
    /// - `AllocationFailed` if any array cannot be reserved
    pub fn run(&self) -> Result<BenchmarkReport> {
        self.config.validate()?;
        match self.config.precision {
            Precision::F32 => self.run_typed::<f32>(),
            Precision::F64 => self.run_typed::<f64>(),
        }
    }

    fn run_typed<T: StreamElement>(&self) -> Result<BenchmarkReport> {
        let config = &self.config;
        let units = config.units();
        let _span = info_span!("run", units, elements = config.elements, precision = T::NAME).entered();

        let pool = build_pool(units)?;
        let placement = worker_placement(&pool);

        let mut workspace = Workspace::<T>::new(&pool, config.elements, units)?;
        let footprint = workspace.footprint();
        info!(
            partition = workspace.partition_size(),
            total_mib = MemoryFootprint::mib(footprint.total_bytes),
            "arrays initialized"
        );

        let granularity = check_tick(&self.clock);
        let warmup = warmup::estimate(&pool, &self.clock, &mut workspace, granularity);

        let runner = KernelRunner::new(&pool, &self.clock, config.ntimes, config.scalar);
        let timings = runner.run(&mut workspace)?;

        let traffic = Traffic {
            element_bytes: T::BYTES,
            partition: workspace.partition_size(),
            units,
        };
        let stats = reduce(&timings, &traffic);
        info!(trials = config.ntimes, "benchmark complete");

        Ok(BenchmarkReport {
            config: config.clone(),
            element_bytes: T::BYTES,
            online_cpus: online_cpus(),
            placement,
            partition_size: workspace.partition_size(),
            dropped_elements: workspace.dropped_elements(),
            footprint,
            granularity,
            warmup,
            timings,
            stats,
        })
    }
}

/// Pool with exactly `units` named workers
///
/// # Errors
///
/// Returns `ThreadPool` if the threads cannot be spawned.
pub fn build_pool(units: usize) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(units)
        .thread_name(|i| format!("caudal-worker-{i}"))
        .build()?)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::clock::SteppingClock;
    use crate::error::CaudalError;
    use crate::kernel::Kernel;

    fn small_config(threads: usize) -> RunConfig {
        RunConfig::new()
            .with_elements(1200)
            .with_ntimes(3)
            .with_threads(NonZeroUsize::new(threads).unwrap())
    }

    #[test]
    fn test_run_produces_four_rows() {
        let report = StreamBenchmark::new(small_config(3)).run().unwrap();
        assert_eq!(report.partition_size, 400);
        assert_eq!(report.dropped_elements, 0);
        assert_eq!(report.element_bytes, 8);
        assert_eq!(report.placement.len(), 3);
        let order: Vec<Kernel> = report.stats.kernels.iter().map(|k| k.kernel).collect();
        assert_eq!(order, Kernel::ALL.to_vec());
        for row in &report.stats.kernels {
            assert_eq!(row.samples, 2);
        }
    }

    #[test]
    fn test_run_with_stepping_clock_is_deterministic() {
        let clock = SteppingClock::new(0.0, 1.0 / 1024.0);
        let bench = StreamBenchmark::with_clock(small_config(2), clock);
        let report = bench.run().unwrap();
        for row in &report.stats.kernels {
            assert_eq!(row.min_time, 1.0 / 1024.0);
            assert_eq!(row.max_time, 1.0 / 1024.0);
        }
        assert_eq!(report.granularity.raw_us, 1953);
    }

    #[test]
    fn test_run_f32_uses_four_byte_elements() {
        let config = small_config(2).with_precision(Precision::F32);
        let report = StreamBenchmark::new(config).run().unwrap();
        assert_eq!(report.element_bytes, 4);
        assert_eq!(report.footprint.per_array_bytes, 600 * 4);
    }

    #[test]
    fn test_run_normalizes_raw_single_trial() {
        let mut config = small_config(1);
        config.ntimes = 1;
        let bench = StreamBenchmark::new(config);
        assert_eq!(bench.config().ntimes, crate::config::DEFAULT_NTIMES);
        let report = bench.run().unwrap();
        assert_eq!(report.timings.ntimes(), crate::config::DEFAULT_NTIMES);
        assert_eq!(report.config.ntimes, crate::config::DEFAULT_NTIMES);
    }

    #[test]
    fn test_run_rejects_zero_elements() {
        let config = small_config(1).with_elements(0);
        let err = StreamBenchmark::new(config).run().unwrap_err();
        assert!(matches!(err, CaudalError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_build_pool_names_workers() {
        let pool = build_pool(2).unwrap();
        let names = pool.broadcast(|_| std::thread::current().name().map(str::to_string));
        assert_eq!(
            names,
            vec![
                Some("caudal-worker-0".to_string()),
                Some("caudal-worker-1".to_string())
            ]
        );
    }
}
