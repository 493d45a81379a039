//! CPU count and worker placement
//!
//! Informational only: nothing here affects what is measured.

use std::num::NonZeroUsize;

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

/// Where one pool worker was running when probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPlacement {
    /// Worker index within the pool
    pub worker: usize,
    /// CPU the worker was running on, if the platform can tell
    pub cpu: Option<usize>,
}

/// Number of CPUs currently online
#[cfg(target_family = "unix")]
#[must_use]
pub fn online_cpus() -> usize {
    // SAFETY: sysconf only reads a system constant
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    usize::try_from(n)
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or_else(|| available_threads().get())
}

/// Number of CPUs currently online
#[cfg(not(target_family = "unix"))]
#[must_use]
pub fn online_cpus() -> usize {
    available_threads().get()
}

/// Parallelism the process may use, at least 1
#[must_use]
pub fn available_threads() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// CPU the calling thread is running on
#[cfg(target_os = "linux")]
#[must_use]
pub fn current_cpu() -> Option<usize> {
    // SAFETY: sched_getcpu takes no arguments and only reports state
    let cpu = unsafe { libc::sched_getcpu() };
    usize::try_from(cpu).ok()
}

/// CPU the calling thread is running on
#[cfg(not(target_os = "linux"))]
#[must_use]
pub fn current_cpu() -> Option<usize> {
    None
}

/// Probe every worker in `pool` for its current CPU
///
/// Results are in worker index order.
#[must_use]
pub fn worker_placement(pool: &ThreadPool) -> Vec<WorkerPlacement> {
    pool.broadcast(|ctx| WorkerPlacement {
        worker: ctx.index(),
        cpu: current_cpu(),
    })
}
