//! Numeric element types the kernels run over
//!
//! The benchmark is generic over single- and double-precision floats. The
//! trait carries only what the kernels and the byte accounting need.

use std::fmt::Debug;
use std::ops::{Add, Mul};

/// Floating point element stored in the A, B and C arrays
pub trait StreamElement:
    Copy + Debug + PartialEq + Send + Sync + Add<Output = Self> + Mul<Output = Self> + 'static
{
    /// Size of one element in bytes
    const BYTES: usize;

    /// Short type name for reports (`f32` / `f64`)
    const NAME: &'static str;

    /// Convert a constant into this element type
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64` (tests and reporting)
    fn to_f64(self) -> f64;
}

impl StreamElement for f32 {
    const BYTES: usize = std::mem::size_of::<f32>();
    const NAME: &'static str = "f32";

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl StreamElement for f64 {
    const BYTES: usize = std::mem::size_of::<f64>();
    const NAME: &'static str = "f64";

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
