//! Error types for the bandwidth benchmark
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Timing
//! anomalies (a clock finer than one microsecond) are not errors and never
//! appear here.

use thiserror::Error;

/// Errors that abort a benchmark run
#[derive(Debug, Error)]
pub enum CaudalError {
    /// Invalid run configuration (element count, unit count, precision)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A per-unit buffer could not be allocated
    #[error("Failed to allocate buffer {buffer} for unit {unit}: {bytes} bytes")]
    AllocationFailed {
        /// Ordinal of the parallel unit
        unit: usize,
        /// Buffer name (`a`, `b` or `c`)
        buffer: char,
        /// Requested size in bytes
        bytes: usize,
    },

    /// The worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Report serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rayon::ThreadPoolBuildError> for CaudalError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}

impl From<serde_json::Error> for CaudalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, CaudalError>;
