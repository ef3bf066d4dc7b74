//! Aligned square grid storage.
//!
//! The kernels in this crate are memory-bound: their performance is decided
//! by how the grid sits in memory, not by the arithmetic. [`AlignedGrid`]
//! therefore owns a single contiguous row-major `f32` allocation aligned to
//! [`GRID_ALIGN`] (64 bytes), so that
//!
//! - unaligned 4-wide vector loads at arbitrary offsets never straddle more
//!   cache lines than necessary, and
//! - a row always starts on a cache-line boundary.
//!
//! A grid is exclusively owned; kernels borrow it for the duration of one
//! call and retain nothing. [`AlignedGrid::transposed`] produces the
//! column-major snapshot the blocked kernels read vertical neighbors from.
//! The snapshot is independent storage: mutating the source grid makes it
//! stale, and regenerating it is the caller's job.
//!
//! Construction rejects edge lengths below 2. A 1×1 grid has zero neighbors
//! for its only cell, so there is no local mean to compute.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, StencilError};

/// Alignment, in bytes, of every grid allocation.
pub const GRID_ALIGN: usize = 64;

/// Absolute per-cell tolerance used when comparing kernel outputs.
pub const EPSILON: f32 = 2.0e-4;

/// Seed used by the benchmark binary for reproducible grid fills.
pub const DEFAULT_SEED: u64 = 42;

/// An owned N×N `f32` grid in row-major order, 64-byte aligned.
pub struct AlignedGrid {
    ptr: NonNull<f32>,
    n: usize,
}

// The buffer is uniquely owned and carries no interior mutability; sharing
// follows the usual borrow rules.
unsafe impl Send for AlignedGrid {}
unsafe impl Sync for AlignedGrid {}

impl AlignedGrid {
    /// Allocate an N×N grid filled with zeros.
    ///
    /// Fails with [`StencilError::GridTooSmall`] for `n < 2` and
    /// [`StencilError::GridTooLarge`] when the element count overflows.
    pub fn zeroed(n: usize) -> Result<Self> {
        if n < 2 {
            return Err(StencilError::GridTooSmall(n));
        }
        let layout = Self::layout(n)?;
        Ok(Self::alloc(n, layout))
    }

    /// Allocate an N×N grid filled with uniform values in `[min, max]`,
    /// drawn from a seeded generator. Two grids built with the same seed and
    /// bounds are element-for-element identical.
    pub fn random(n: usize, min: f32, max: f32, seed: u64) -> Result<Self> {
        let mut grid = Self::zeroed(n)?;
        let mut rng = StdRng::seed_from_u64(seed);
        for cell in grid.as_mut_slice() {
            *cell = rng.gen_range(min..=max);
        }
        Ok(grid)
    }

    /// Edge length of the grid.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of cells (`n * n`).
    #[inline]
    pub fn len(&self) -> usize {
        self.n * self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // n >= 2 by construction
    }

    /// The whole grid as a row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    /// The whole grid as a mutable row-major slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }

    /// A fresh zeroed grid with the same edge length, used by kernels as
    /// their private scratch buffer. Infallible because `self.n` was
    /// validated when `self` was constructed.
    pub fn new_like(&self) -> Self {
        let layout = Self::layout(self.n).unwrap_or_else(|_| unreachable!());
        Self::alloc(self.n, layout)
    }

    /// A transposed snapshot: `out[i*N + k] == self[k*N + i]`.
    pub fn transposed(&self) -> Self {
        let n = self.n;
        let mut out = self.new_like();
        let src = self.as_slice();
        let dst = out.as_mut_slice();
        for i in 0..n {
            let row = i * n;
            for k in 0..n {
                dst[row + k] = src[k * n + i];
            }
        }
        out
    }

    fn layout(n: usize) -> Result<Layout> {
        let bytes = n
            .checked_mul(n)
            .and_then(|cells| cells.checked_mul(mem::size_of::<f32>()))
            .ok_or(StencilError::GridTooLarge(n))?;
        Layout::from_size_align(bytes, GRID_ALIGN).map_err(|_| StencilError::GridTooLarge(n))
    }

    fn alloc(n: usize, layout: Layout) -> Self {
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw.cast::<f32>()) else {
            handle_alloc_error(layout);
        };
        Self { ptr, n }
    }
}

impl Drop for AlignedGrid {
    fn drop(&mut self) {
        // Layout was validated at construction.
        if let Ok(layout) = Self::layout(self.n) {
            unsafe { dealloc(self.ptr.as_ptr().cast(), layout) };
        }
    }
}

impl Clone for AlignedGrid {
    fn clone(&self) -> Self {
        let mut out = self.new_like();
        out.as_mut_slice().copy_from_slice(self.as_slice());
        out
    }
}

impl Index<(usize, usize)> for AlignedGrid {
    type Output = f32;

    /// Bounds-checked access to cell `(x, y)` (row `x`, column `y`).
    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &f32 {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) out of bounds for {0}x{0} grid", self.n);
        &self.as_slice()[x * self.n + y]
    }
}

impl IndexMut<(usize, usize)> for AlignedGrid {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut f32 {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) out of bounds for {0}x{0} grid", self.n);
        let n = self.n;
        &mut self.as_mut_slice()[x * n + y]
    }
}

/// Debug dump, one row per line, six significant digits.
impl fmt::Display for AlignedGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let src = self.as_slice();
        for row in src.chunks_exact(self.n) {
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v:.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Elementwise approximate-equality check between two grids.
///
/// Returns the first divergent cell as a [`StencilError::Validation`] so a
/// test harness can report it and keep going; matching grids return `Ok`.
pub fn verify_match(expected: &AlignedGrid, actual: &AlignedGrid, epsilon: f32) -> Result<()> {
    assert_eq!(expected.n(), actual.n(), "grid sizes differ");
    let n = expected.n();
    let a = expected.as_slice();
    let b = actual.as_slice();
    for x in 0..n {
        for y in 0..n {
            let (e, v) = (a[x * n + y], b[x * n + y]);
            // Negated form so a NaN on either side fails the comparison.
            if !((e - v).abs() < epsilon) {
                return Err(StencilError::Validation {
                    x,
                    y,
                    expected: e,
                    actual: v,
                    epsilon,
                });
            }
        }
    }
    Ok(())
}
