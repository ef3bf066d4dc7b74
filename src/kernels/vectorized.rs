//! Tiled kernel with 4-wide vector accumulation.
//!
//! Same tiling and transpose strategy as [`BlockedKernel`], but each span
//! sum runs through [`span_sum`]'s scalar-prologue / vector-body /
//! scalar-epilogue pipeline. Unlike the scalar kernels, both spans are
//! summed *including* the center cell (both pass through it), so the
//! combined total subtracts the center exactly twice before dividing.
//! Write-back is vectorized too: four elements per store, scalar remainder.
//!
//! [`BlockedKernel`]: crate::kernels::BlockedKernel
//! [`span_sum`]: crate::simd::span_sum

use crate::error::Result;
use crate::grid::AlignedGrid;
use crate::kernels::{check_tiling, Window};
use crate::simd::{copy_row, span_sum};

/// Tiled SIMD local-mean kernel for a fixed grid size and block size.
#[derive(Debug, Clone, Copy)]
pub struct VectorizedKernel {
    n: usize,
    block: usize,
}

impl VectorizedKernel {
    /// Validate the tiling configuration once, before any allocation.
    pub fn new(n: usize, block: usize) -> Result<Self> {
        check_tiling(n, block)?;
        Ok(Self { n, block })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn block(&self) -> usize {
        self.block
    }

    /// Run the filter. `trans` must be a current transposed snapshot of
    /// `grid`; both must match the size this kernel was built for.
    pub fn run(&self, grid: &mut AlignedGrid, trans: &AlignedGrid, k: usize) {
        let (n, b) = (self.n, self.block);
        assert_eq!(grid.n(), n, "grid size does not match kernel configuration");
        assert_eq!(trans.n(), n, "transpose size does not match kernel configuration");

        let mut tmp = grid.new_like();
        {
            let src = grid.as_slice();
            let tsrc = trans.as_slice();
            let out = tmp.as_mut_slice();

            for (tile_row, out_rows) in out.chunks_exact_mut(b * n).enumerate() {
                compute_tile_row(src, tsrc, out_rows, n, k, b, tile_row * b);
            }
        }

        for (dst, row) in grid
            .as_mut_slice()
            .chunks_exact_mut(n)
            .zip(tmp.as_slice().chunks_exact(n))
        {
            copy_row(dst, row);
        }
    }
}

/// Compute one tile row (grid rows `x0..x0 + block`) into `out`, which
/// holds exactly those rows (`block * n` elements).
///
/// Shared between the single-threaded [`VectorizedKernel`] and the
/// parallel kernel, which hands each worker a disjoint tile row.
pub(crate) fn compute_tile_row(
    src: &[f32],
    trans: &[f32],
    out: &mut [f32],
    n: usize,
    k: usize,
    block: usize,
    x0: usize,
) {
    debug_assert_eq!(out.len(), block * n);

    for j0 in (0..n).step_by(block) {
        for xr in 0..block {
            let x = x0 + xr;
            let row = &src[x * n..(x + 1) * n];

            for y in j0..j0 + block {
                let w = Window::new(n, k, x, y);
                let center = row[y];
                let col = &trans[y * n..(y + 1) * n];

                // Both spans include the center; take it back out twice.
                let total = span_sum(row, w.left, w.right) + span_sum(col, w.bottom, w.upper)
                    - 2.0 * center;

                let count = w.neighbor_count();
                out[xr * n + y] = if count == 0 {
                    center
                } else {
                    total / count as f32
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StencilError;
    use crate::grid::{verify_match, EPSILON};
    use crate::kernels::reference;

    #[test]
    fn rejects_indivisible_sizes() {
        assert!(matches!(
            VectorizedKernel::new(9, 4),
            Err(StencilError::BlockSize { n: 9, block: 4 })
        ));
    }

    #[test]
    fn matches_reference() {
        // Block sizes not divisible by the lane width exercise the scalar
        // prologue and epilogue on most spans.
        for (n, k, b) in [
            (8usize, 1usize, 4usize),
            (16, 3, 4),
            (12, 2, 3),
            (12, 0, 6),
            (16, 15, 8),
            (20, 6, 5),
        ] {
            let mut expected = AlignedGrid::random(n, -100.0, 100.0, 33).unwrap();
            let mut grid = expected.clone();
            reference::compute(&mut expected, k);

            let trans = grid.transposed();
            VectorizedKernel::new(n, b).unwrap().run(&mut grid, &trans, k);

            verify_match(&expected, &grid, EPSILON)
                .unwrap_or_else(|e| panic!("n={n} k={k} b={b}: {e}"));
        }
    }

    #[test]
    fn center_subtraction_is_exact_for_constant_grids() {
        // On a constant grid the mean equals the constant everywhere; any
        // off-by-one in the double center subtraction would shift it.
        let n = 8;
        let mut grid = AlignedGrid::zeroed(n).unwrap();
        grid.as_mut_slice().fill(3.25);

        let trans = grid.transposed();
        VectorizedKernel::new(n, 4).unwrap().run(&mut grid, &trans, 2);

        assert!(grid.as_slice().iter().all(|&v| (v - 3.25).abs() < 1e-6));
    }
}
