//! The four STREAM vector kernels
//!
//! | Kernel | Operation                   | Words moved per element |
//! |--------|-----------------------------|-------------------------|
//! | Copy   | `c[i] = a[i]`               | 2                       |
//! | Scale  | `b[i] = scalar * c[i]`      | 2                       |
//! | Add    | `c[i] = a[i] + b[i]`        | 3                       |
//! | Triad  | `a[i] = b[i] + scalar * c[i]` | 3                     |
//!
//! Each kernel reads what the previous one wrote, so a trial always runs them
//! in [`Kernel::ALL`] order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::StreamElement;
use crate::workspace::UnitBuffers;

/// One of the four timed kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// `c = a`
    Copy,
    /// `b = scalar * c`
    Scale,
    /// `c = a + b`
    Add,
    /// `a = b + scalar * c`
    Triad,
}

impl Kernel {
    /// All kernels in execution order
    pub const ALL: [Kernel; 4] = [Kernel::Copy, Kernel::Scale, Kernel::Add, Kernel::Triad];

    /// Row index into timing tables
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Copy => 0,
            Self::Scale => 1,
            Self::Add => 2,
            Self::Triad => 3,
        }
    }

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Scale => "Scale",
            Self::Add => "Add",
            Self::Triad => "Triad",
        }
    }

    /// Array words read plus written per element
    #[must_use]
    pub const fn words_per_element(self) -> usize {
        match self {
            Self::Copy | Self::Scale => 2,
            Self::Add | Self::Triad => 3,
        }
    }

    /// Bytes moved by one pass over every unit's partition
    #[must_use]
    pub const fn bytes_moved(self, element_bytes: usize, partition: usize, units: usize) -> usize {
        self.words_per_element() * element_bytes * partition * units
    }

    /// Apply this kernel to one unit's arrays
    #[inline]
    pub fn apply<T: StreamElement>(self, unit: &mut UnitBuffers<T>, scalar: T) {
        match self {
            Self::Copy => copy(&unit.a, &mut unit.c),
            Self::Scale => scale(&mut unit.b, &unit.c, scalar),
            Self::Add => add(&unit.a, &unit.b, &mut unit.c),
            Self::Triad => triad(&mut unit.a, &unit.b, &unit.c, scalar),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `c[i] = a[i]`
#[inline]
pub fn copy<T: StreamElement>(a: &[T], c: &mut [T]) {
    for (ci, &ai) in c.iter_mut().zip(a) {
        *ci = ai;
    }
}

/// `b[i] = scalar * c[i]`
#[inline]
pub fn scale<T: StreamElement>(b: &mut [T], c: &[T], scalar: T) {
    for (bi, &ci) in b.iter_mut().zip(c) {
        *bi = scalar * ci;
    }
}

/// `c[i] = a[i] + b[i]`
#[inline]
pub fn add<T: StreamElement>(a: &[T], b: &[T], c: &mut [T]) {
    for ((ci, &ai), &bi) in c.iter_mut().zip(a).zip(b) {
        *ci = ai + bi;
    }
}

/// `a[i] = b[i] + scalar * c[i]`
#[inline]
pub fn triad<T: StreamElement>(a: &mut [T], b: &[T], c: &[T], scalar: T) {
    for ((ai, &bi), &ci) in a.iter_mut().zip(b).zip(c) {
        *ai = bi + scalar * ci;
    }
}

/// `a[i] = 2.0 * a[i]`, the pass used for the up-front timing estimate
#[inline]
pub fn double<T: StreamElement>(a: &mut [T]) {
    let two = T::from_f64(2.0);
    for ai in a.iter_mut() {
        *ai = two * *ai;
    }
}
