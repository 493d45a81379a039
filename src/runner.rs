//! Timed execution of the kernels over all units
//!
//! Each trial runs Copy, Scale, Add and Triad in that order. Every kernel is
//! one parallel region across the pool: the clock is read just before the
//! region starts and just after the last unit finishes.

use rayon::ThreadPool;
use tracing::{debug, debug_span};

use crate::clock::{time_region, Clock};
use crate::element::StreamElement;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::stats::TrialTimings;
use crate::workspace::Workspace;

/// Runs the kernel trials and records their timings
pub struct KernelRunner<'a, C: Clock + ?Sized> {
    pool: &'a ThreadPool,
    clock: &'a C,
    ntimes: usize,
    scalar: f64,
}

impl<'a, C: Clock + ?Sized> KernelRunner<'a, C> {
    /// Create a runner for `ntimes` trials with the given scalar
    #[must_use]
    pub fn new(pool: &'a ThreadPool, clock: &'a C, ntimes: usize, scalar: f64) -> Self {
        Self {
            pool,
            clock,
            ntimes,
            scalar,
        }
    }

    /// Number of trials this runner executes
    #[must_use]
    pub fn ntimes(&self) -> usize {
        self.ntimes
    }

    /// Run one kernel across every unit and return the elapsed seconds
    pub fn time_kernel<T: StreamElement>(&self, workspace: &mut Workspace<T>, kernel: Kernel) -> f64 {
        let scalar = T::from_f64(self.scalar);
        time_region(self.clock, || {
            workspace.for_each_unit(self.pool, |unit| kernel.apply(unit, scalar));
        })
    }

    /// Run the four kernels once, recording into column `trial`
    pub fn run_trial<T: StreamElement>(
        &self,
        workspace: &mut Workspace<T>,
        trial: usize,
        timings: &mut TrialTimings,
    ) {
        for kernel in Kernel::ALL {
            let elapsed = self.time_kernel(workspace, kernel);
            timings.record(kernel, trial, elapsed);
        }
    }

    /// Run all trials
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the runner was built with fewer than
    /// two trials.
    pub fn run<T: StreamElement>(&self, workspace: &mut Workspace<T>) -> Result<TrialTimings> {
        let mut timings = TrialTimings::new(self.ntimes)?;
        for trial in 0..self.ntimes {
            let _span = debug_span!("trial", trial).entered();
            self.run_trial(workspace, trial, &mut timings);
            debug!(
                copy = timings.get(Kernel::Copy, trial),
                triad = timings.get(Kernel::Triad, trial),
                "trial complete"
            );
        }
        Ok(timings)
    }
}
