//! Local-mean stencil kernels.
//!
//! Every kernel computes the same filter: each cell is replaced by the
//! average of its row- and column-neighbors within radius K, the window
//! clipped at the grid boundary. Updates are Jacobi-style, so each run
//! writes a private scratch grid and copies it back only after every cell
//! has been computed from pre-update values.
//!
//! The variants differ only in how they walk memory:
//!
//! | Kernel | Tiling | Vector ops | Threads | Role |
//! |--------|--------|------------|---------|------|
//! | [`reference::compute`] | none | none | 1 | correctness oracle |
//! | [`BlockedKernel`] | B×B | none | 1 | cache locality |
//! | [`VectorizedKernel`] | B×B | 4-wide | 1 | register throughput |
//! | [`ParallelKernel`] | B×B | 4-wide | pool | full machine |
//!
//! The blocked variants read vertical neighbors from a transposed snapshot
//! of the grid, turning the strided column walk into a sequential one:
//!
//! ```text
//! for I in 0..N step B            (tile row)
//!   for J in 0..N step B          (tile column)
//!     for x in I..I+B
//!       for y in J..J+B
//!         horizontal sum: grid[x*N + left ..= x*N + right]
//!         vertical sum:   trans[y*N + bottom ..= y*N + upper]
//! ```
//!
//! Tiling-dependent kernels validate `N % B == 0` once, at construction,
//! before any allocation or computation.

use crate::error::{Result, StencilError};

pub mod blocked;
pub mod parallel;
pub mod reference;
pub mod vectorized;

pub use blocked::BlockedKernel;
pub use parallel::ParallelKernel;
pub use vectorized::VectorizedKernel;

/// The clipped cross-shaped neighborhood of one cell.
///
/// All bounds are inclusive. The horizontal span is `left..=right` within
/// row `x`; the vertical span is `bottom..=upper` within column `y`. Both
/// spans pass through the center cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
    pub upper: usize,
}

impl Window {
    #[inline]
    pub fn new(n: usize, k: usize, x: usize, y: usize) -> Self {
        debug_assert!(x < n && y < n);
        Self {
            left: y.saturating_sub(k),
            right: y.saturating_add(k).min(n - 1),
            bottom: x.saturating_sub(k),
            upper: x.saturating_add(k).min(n - 1),
        }
    }

    /// Cells in the union of both spans, excluding the center. Zero only
    /// when K = 0, in which case the kernels leave the cell unchanged
    /// instead of dividing.
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        (self.right - self.left) + (self.upper - self.bottom)
    }
}

/// Shared construction-time checks for the tiling-dependent kernels.
pub(crate) fn check_tiling(n: usize, block: usize) -> Result<()> {
    if n < 2 {
        return Err(StencilError::GridTooSmall(n));
    }
    if block == 0 || n % block != 0 {
        return Err(StencilError::BlockSize { n, block });
    }
    Ok(())
}
