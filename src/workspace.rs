//! Per-unit buffer allocation and partitioning
//!
//! Every parallel unit owns three equal-length arrays (A, B, C). The total
//! element count is split evenly; the remainder is left out of the
//! measurement entirely.
//!
//! Units are bound to pool workers statically: worker `w` of an `n`-thread
//! pool owns units `w`, `w + n`, `w + 2n` and so on, in every parallel region.
//! With one worker per unit, unit `i` always runs on worker `i`. Reservation
//! does not touch memory, so each unit's pages are first touched by the worker
//! that later runs the kernels on them.

use std::sync::{Mutex, PoisonError};

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::element::StreamElement;
use crate::error::{CaudalError, Result};

/// Initial value of every element of A
pub const INIT_A: f64 = 1.0;
/// Initial value of every element of B
pub const INIT_B: f64 = 2.0;
/// Initial value of every element of C
pub const INIT_C: f64 = 0.0;

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = MIB * 1024.0;

// ============================================================================
// Partitioning
// ============================================================================

/// Elements per unit: `floor(total / units)`
///
/// # Errors
///
/// Returns `InvalidConfiguration` if either argument is zero.
pub fn partition_size(total_elements: usize, units: usize) -> Result<usize> {
    if total_elements == 0 {
        return Err(CaudalError::InvalidConfiguration(
            "element count must be a positive integer".to_string(),
        ));
    }
    if units == 0 {
        return Err(CaudalError::InvalidConfiguration(
            "unit count must be at least 1".to_string(),
        ));
    }
    Ok(total_elements / units)
}

/// Elements not covered by any unit's partition
#[must_use]
pub fn dropped_elements(total_elements: usize, units: usize) -> usize {
    if units == 0 {
        return total_elements;
    }
    total_elements % units
}

// ============================================================================
// UnitBuffers
// ============================================================================

/// The A, B and C arrays owned by one parallel unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitBuffers<T> {
    /// Ordinal of the owning unit in `[0, units)`
    pub ordinal: usize,
    /// Array A
    pub a: Vec<T>,
    /// Array B
    pub b: Vec<T>,
    /// Array C
    pub c: Vec<T>,
}

impl<T: StreamElement> UnitBuffers<T> {
    /// Reserve three arrays of `len` elements each
    ///
    /// The arrays are empty until [`UnitBuffers::initialize`] runs.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any array cannot be reserved.
    pub fn allocate(ordinal: usize, len: usize) -> Result<Self> {
        Ok(Self {
            ordinal,
            a: reserve::<T>(ordinal, 'a', len)?,
            b: reserve::<T>(ordinal, 'b', len)?,
            c: reserve::<T>(ordinal, 'c', len)?,
        })
    }

    /// Fill A with 1.0, B with 2.0 and C with 0.0 over `len` elements
    pub fn initialize(&mut self, len: usize) {
        fill(&mut self.a, len, T::from_f64(INIT_A));
        fill(&mut self.b, len, T::from_f64(INIT_B));
        fill(&mut self.c, len, T::from_f64(INIT_C));
    }

    /// Length shared by the three arrays
    #[must_use]
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Whether the arrays hold no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

fn reserve<T: StreamElement>(unit: usize, buffer: char, len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| CaudalError::AllocationFailed {
            unit,
            buffer,
            bytes: len.saturating_mul(T::BYTES),
        })?;
    Ok(v)
}

fn fill<T: StreamElement>(v: &mut Vec<T>, len: usize, value: T) {
    v.clear();
    v.resize(len, value);
}

// ============================================================================
// MemoryFootprint
// ============================================================================

/// Memory required by a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFootprint {
    /// Bytes per array
    pub per_array_bytes: usize,
    /// Bytes per unit (three arrays)
    pub per_unit_bytes: usize,
    /// Bytes across all units
    pub total_bytes: usize,
    /// Number of units counted in `total_bytes`
    pub units: usize,
}

impl MemoryFootprint {
    /// Footprint of `units` units with `partition` elements of `element_bytes` each
    #[must_use]
    pub fn new(partition: usize, units: usize, element_bytes: usize) -> Self {
        let per_array_bytes = partition.saturating_mul(element_bytes);
        let per_unit_bytes = per_array_bytes.saturating_mul(3);
        Self {
            per_array_bytes,
            per_unit_bytes,
            total_bytes: per_unit_bytes.saturating_mul(units),
            units,
        }
    }

    /// Convert a byte count to MiB
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mib(bytes: usize) -> f64 {
        bytes as f64 / MIB
    }

    /// Convert a byte count to GiB
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gib(bytes: usize) -> f64 {
        bytes as f64 / GIB
    }
}

// ============================================================================
// Workspace
// ============================================================================

/// All units' buffers plus the partition geometry
#[derive(Debug)]
pub struct Workspace<T> {
    units: Vec<UnitBuffers<T>>,
    partition: usize,
    requested: usize,
}

impl<T: StreamElement> Workspace<T> {
    /// Allocate and initialize buffers for `units` units inside `pool`
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `total_elements` or `units` is zero
    /// - `AllocationFailed` if any unit's array cannot be reserved
    pub fn new(pool: &ThreadPool, total_elements: usize, units: usize) -> Result<Self> {
        let partition = partition_size(total_elements, units)?;
        let dropped = dropped_elements(total_elements, units);
        if dropped > 0 {
            info!(
                dropped,
                "element count not divisible by unit count; remainder excluded"
            );
        }

        let buffers = (0..units)
            .map(|ordinal| UnitBuffers::allocate(ordinal, partition))
            .collect::<Result<Vec<_>>>()?;

        let mut workspace = Self {
            units: buffers,
            partition,
            requested: total_elements,
        };
        workspace.initialize(pool);
        debug!(units, partition, "workspace allocated");
        Ok(workspace)
    }

    /// Reset every unit to A = 1.0, B = 2.0, C = 0.0, in parallel
    pub fn initialize(&mut self, pool: &ThreadPool) {
        let partition = self.partition;
        self.for_each_unit(pool, |unit| unit.initialize(partition));
    }

    /// Run `f` on every unit in parallel and return once all units finish
    ///
    /// Every pool worker runs its own units (see the module docs), so the
    /// unit-to-worker mapping is the same in every call. `broadcast` does not
    /// return until the slowest worker completes.
    pub fn for_each_unit<F>(&mut self, pool: &ThreadPool, f: F)
    where
        F: Fn(&mut UnitBuffers<T>) + Send + Sync,
    {
        // Each slot is locked by exactly one worker, so the locks never contend.
        let slots: Vec<Mutex<&mut UnitBuffers<T>>> =
            self.units.iter_mut().map(Mutex::new).collect();
        pool.broadcast(|ctx| {
            for slot in slots.iter().skip(ctx.index()).step_by(ctx.num_threads()) {
                let mut unit = slot.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut **unit);
            }
        });
    }

    /// Elements per unit
    #[must_use]
    pub fn partition_size(&self) -> usize {
        self.partition
    }

    /// Number of units
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Elements actually measured (`partition * units`)
    #[must_use]
    pub fn measured_elements(&self) -> usize {
        self.partition * self.units.len()
    }

    /// Requested elements left out by the even split
    #[must_use]
    pub fn dropped_elements(&self) -> usize {
        self.requested - self.measured_elements()
    }

    /// Memory used by the arrays
    #[must_use]
    pub fn footprint(&self) -> MemoryFootprint {
        MemoryFootprint::new(self.partition, self.units.len(), T::BYTES)
    }

    /// Read-only view of the units
    #[must_use]
    pub fn units(&self) -> &[UnitBuffers<T>] {
        &self.units
    }
}
