//! # Caudal
//!
//! Sustainable memory bandwidth measurement in the STREAM tradition.
//!
//! Caudal (Spanish: "flow rate") times four simple vector kernels over
//! per-thread arrays and reports the best bandwidth each achieves:
//!
//! | Kernel | Operation              |
//! |--------|------------------------|
//! | Copy   | `c = a`                |
//! | Scale  | `b = scalar * c`       |
//! | Add    | `c = a + b`            |
//! | Triad  | `a = b + scalar * c`   |
//!
//! ## Methodology
//!
//! - **Calibration**: the clock's granularity is measured up front
//! - **Partitioning**: the element count is split evenly across threads;
//!   each thread owns its three arrays outright
//! - **Repetition**: every kernel runs `ntimes` times; the first run is a
//!   warm-up and is discarded
//! - **Accounting**: bandwidth = bytes moved / best time
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::num::NonZeroUsize;
//! use caudal::{RunConfig, StreamBenchmark};
//!
//! let config = RunConfig::new()
//!     .with_elements(10_000_000)
//!     .with_threads(NonZeroUsize::new(4).unwrap());
//! let report = StreamBenchmark::new(config).run().unwrap();
//! for row in &report.stats.kernels {
//!     println!("{}: {:.0} MB/s", row.kernel, row.bandwidth_mb_s);
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// Clippy allows (MUST come after deny/warn to override them)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::uninlined_format_args)] // Prefer explicit format args
#![allow(clippy::float_cmp)] // Exact float comparisons in tests

/// Benchmark harness tying every phase together
pub mod bench;
pub mod calibrate;
/// CLI command implementations (extracted for testability)
pub mod cli;
pub mod clock;
pub mod config;
pub mod element;
pub mod error;
pub mod kernel;
pub mod report;
pub mod runner;
pub mod stats;
/// CPU count and worker placement probing
pub mod topology;
/// Up-front timing estimate
pub mod warmup;
pub mod workspace;

// Re-exports for convenience
pub use bench::{BenchmarkReport, StreamBenchmark};
pub use config::{Precision, RunConfig};
pub use error::{CaudalError, Result};
pub use kernel::Kernel;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
        assert!(VERSION.contains('.'));
    }
}
