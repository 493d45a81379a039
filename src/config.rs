//! Run configuration
//!
//! Defaults mirror the classic STREAM build-time knobs. Every value the core
//! needs is carried explicitly here; nothing below this module reads the
//! environment.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CaudalError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default total element count across all units
pub const DEFAULT_ELEMENTS: usize = 20_000_000;

/// Default number of trials per kernel
pub const DEFAULT_NTIMES: usize = 10;

/// Minimum number of trials (one warm-up plus one measured)
pub const MIN_NTIMES: usize = 2;

/// Scalar multiplier used by the Scale and Triad kernels
pub const SCALAR: f64 = 3.0;

// ============================================================================
// Precision
// ============================================================================

/// Numeric element type of the benchmark arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Single precision (4 bytes per element)
    F32,
    /// Double precision (8 bytes per element)
    #[default]
    F64,
}

impl Precision {
    /// Bytes per element
    #[must_use]
    pub const fn bytes_per_element(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

impl FromStr for Precision {
    type Err = CaudalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float" | "single" => Ok(Self::F32),
            "f64" | "double" => Ok(Self::F64),
            other => Err(CaudalError::InvalidConfiguration(format!(
                "Unknown precision '{other}' (expected f32 or f64)"
            ))),
        }
    }
}

// ============================================================================
// RunConfig
// ============================================================================

/// Configuration for one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Total element count, split evenly across units
    pub elements: usize,
    /// Number of trials per kernel
    ///
    /// Values below [`MIN_NTIMES`] are replaced by [`DEFAULT_NTIMES`] when
    /// deserialized and when a run starts.
    #[serde(deserialize_with = "deserialize_ntimes")]
    pub ntimes: usize,
    /// Element type
    pub precision: Precision,
    /// Scalar for Scale and Triad
    pub scalar: f64,
    /// Number of parallel units (worker threads)
    pub threads: NonZeroUsize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            elements: DEFAULT_ELEMENTS,
            ntimes: DEFAULT_NTIMES,
            precision: Precision::default(),
            scalar: SCALAR,
            threads: NonZeroUsize::MIN,
        }
    }
}

impl RunConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total element count
    #[must_use]
    pub fn with_elements(mut self, elements: usize) -> Self {
        self.elements = elements;
        self
    }

    /// Set the trial count
    ///
    /// Values below [`MIN_NTIMES`] fall back to [`DEFAULT_NTIMES`].
    #[must_use]
    pub fn with_ntimes(mut self, ntimes: usize) -> Self {
        self.ntimes = normalize_ntimes(ntimes);
        self
    }

    /// Set the element type
    #[must_use]
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the number of parallel units
    #[must_use]
    pub fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    /// Copy of this configuration with the trial count normalized
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            ntimes: normalize_ntimes(self.ntimes),
            ..self.clone()
        }
    }

    /// Number of parallel units as a plain count
    #[must_use]
    pub fn units(&self) -> usize {
        self.threads.get()
    }

    /// Check the configuration before any memory is touched
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if:
    /// - the element count is zero
    /// - the element count is smaller than the unit count (empty partitions)
    /// - the scalar is not finite
    pub fn validate(&self) -> Result<()> {
        if self.elements == 0 {
            return Err(CaudalError::InvalidConfiguration(
                "element count must be a positive integer".to_string(),
            ));
        }
        if self.elements < self.units() {
            return Err(CaudalError::InvalidConfiguration(format!(
                "element count {} is smaller than the unit count {}",
                self.elements,
                self.units()
            )));
        }
        if !self.scalar.is_finite() {
            return Err(CaudalError::InvalidConfiguration(format!(
                "scalar {} is not finite",
                self.scalar
            )));
        }
        Ok(())
    }
}

/// Map trial counts of 0 or 1 to the default
///
/// A single trial would leave nothing after the warm-up is discarded.
#[must_use]
pub fn normalize_ntimes(ntimes: usize) -> usize {
    if ntimes < MIN_NTIMES {
        DEFAULT_NTIMES
    } else {
        ntimes
    }
}

fn deserialize_ntimes<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    usize::deserialize(deserializer).map(normalize_ntimes)
}

/// Parse a total element count from user input
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the input is not a positive integer.
pub fn parse_element_count(input: &str) -> Result<usize> {
    let count: usize = input.trim().parse().map_err(|_| {
        CaudalError::InvalidConfiguration(format!("'{input}' is not a valid element count"))
    })?;
    if count == 0 {
        return Err(CaudalError::InvalidConfiguration(
            "element count must be a positive integer".to_string(),
        ));
    }
    Ok(count)
}
