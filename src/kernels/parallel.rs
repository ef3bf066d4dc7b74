//! Thread-parallel SIMD kernel.
//!
//! Per-cell math is identical to [`VectorizedKernel`]; only the iteration is
//! distributed. One call runs two parallel phases over a worker pool:
//!
//! 1. **Compute** — tile rows are claimed dynamically (rayon work-stealing),
//!    because clipped windows make boundary tiles cheaper than interior
//!    ones and a static split would leave workers idle. Each worker owns a
//!    disjoint `B·N` chunk of the scratch buffer, so no locking is needed.
//! 2. **Write-back** — row ranges are split evenly up front (per-row cost is
//!    uniform) and copied into the live grid with the vectorized row copy.
//!
//! All compute-phase writes happen-before every write-back read: the first
//! parallel call joins all workers before the second one starts.
//!
//! [`VectorizedKernel`]: crate::kernels::VectorizedKernel

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Result, StencilError};
use crate::grid::AlignedGrid;
use crate::kernels::{check_tiling, vectorized::compute_tile_row};
use crate::simd::copy_row;

/// Tiled SIMD local-mean kernel executed by a dedicated worker pool.
pub struct ParallelKernel {
    n: usize,
    block: usize,
    pool: ThreadPool,
}

impl ParallelKernel {
    /// Build a kernel using one worker per available CPU.
    pub fn new(n: usize, block: usize) -> Result<Self> {
        Self::with_threads(n, block, 0)
    }

    /// Build a kernel with an explicit worker count (`0` = one per CPU).
    ///
    /// Pool construction failure is fatal to the kernel, per the benchmark
    /// contract: there is no sequential fallback here.
    pub fn with_threads(n: usize, block: usize, threads: usize) -> Result<Self> {
        check_tiling(n, block)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("stencil-worker-{i}"))
            .build()
            .map_err(|e| StencilError::ThreadPool(e.to_string()))?;
        Ok(Self { n, block, pool })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn block(&self) -> usize {
        self.block
    }

    /// Worker count of the underlying pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run the filter. `trans` must be a current transposed snapshot of
    /// `grid`; both must match the size this kernel was built for.
    ///
    /// Output is identical regardless of the worker count: the tile
    /// partition and per-cell arithmetic are fixed, only the claim order
    /// varies.
    pub fn run(&self, grid: &mut AlignedGrid, trans: &AlignedGrid, k: usize) {
        let (n, b) = (self.n, self.block);
        assert_eq!(grid.n(), n, "grid size does not match kernel configuration");
        assert_eq!(trans.n(), n, "transpose size does not match kernel configuration");

        let mut tmp = grid.new_like();

        // Phase 1: compute into the shared scratch buffer, one tile row per
        // work unit.
        {
            let src = grid.as_slice();
            let tsrc = trans.as_slice();
            self.pool.install(|| {
                tmp.as_mut_slice()
                    .par_chunks_mut(b * n)
                    .enumerate()
                    .for_each(|(tile_row, out_rows)| {
                        compute_tile_row(src, tsrc, out_rows, n, k, b, tile_row * b);
                    });
            });
        }

        // Phase 2: copy back row by row. Joining phase 1 above is the
        // barrier that orders every scratch write before these reads.
        self.pool.install(|| {
            grid.as_mut_slice()
                .par_chunks_mut(n)
                .zip(tmp.as_slice().par_chunks(n))
                .for_each(|(dst, row)| copy_row(dst, row));
        });
    }
}
