//! Cache-blocked scalar kernel.
//!
//! Walks the grid in B×B tiles so the rows and transposed columns touched by
//! one tile stay cache-resident across its cells, and reads vertical
//! neighbors from a transposed snapshot (`trans[y*N + i]` instead of
//! `grid[i*N + y]`). The transpose costs one upfront O(N²) pass and buys
//! strictly sequential loads in every vertical reduction, which is the
//! single biggest locality win in this crate.

use crate::error::Result;
use crate::grid::AlignedGrid;
use crate::kernels::{check_tiling, Window};

/// Tiled scalar local-mean kernel for a fixed grid size and block size.
#[derive(Debug, Clone, Copy)]
pub struct BlockedKernel {
    n: usize,
    block: usize,
}

impl BlockedKernel {
    /// Validate the tiling configuration once, before any allocation.
    ///
    /// Fails with [`StencilError::BlockSize`](crate::StencilError::BlockSize)
    /// unless `block > 0` and `n % block == 0`.
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

            for i0 in (0..n).step_by(b) {
                for j0 in (0..n).step_by(b) {
                    for x in i0..i0 + b {
                        for y in j0..j0 + b {
                            let w = Window::new(n, k, x, y);
                            let mut sum = 0.0f32;

                            for i in w.left..=w.right {
                                if i != y {
                                    sum += src[x * n + i];
                                }
                            }
                            // Sequential reads thanks to the transpose.
                            for i in w.bottom..=w.upper {
                                if i != x {
                                    sum += tsrc[y * n + i];
                                }
                            }

                            let count = w.neighbor_count();
                            out[x * n + y] = if count == 0 {
                                src[x * n + y]
                            } else {
                                sum / count as f32
                            };
                        }
                    }
                }
            }
        }

        grid.as_mut_slice().copy_from_slice(tmp.as_slice());
    }
}
