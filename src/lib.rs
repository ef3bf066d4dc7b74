//! Local-mean stencil kernels over square `f32` grids.
//!
//! Each cell of an N×N grid is replaced by the average of its row- and
//! column-neighbors within radius K, with the window clipped at the grid
//! boundary — the classic cross-shaped stencil used to benchmark
//! memory-bound numerical kernels. Four kernels compute the same filter
//! with increasing machine sympathy, and all agree within 2×10⁻⁴ per cell:
//!
//! | Kernel | Strategy |
//! |--------|----------|
//! | [`local_mean_reference`] | scalar, unblocked; the correctness oracle |
//! | [`local_mean_blocked`] | B×B cache tiles + transposed column reads |
//! | [`local_mean_simd`] | same tiles, 4-wide vector span sums |
//! | [`local_mean_parallel`] | same math, tile rows over a worker pool |
//!
//! Updates are Jacobi-style: every kernel computes into a private scratch
//! grid and copies back only when all cells are done, so no cell ever reads
//! a neighbor's already-updated value.
//!
//! # Example
//!
//! ```
//! use stencil_mean::{local_mean_parallel, local_mean_reference, verify_match};
//! use stencil_mean::{AlignedGrid, DEFAULT_SEED, EPSILON};
//!
//! let mut expected = AlignedGrid::random(64, -100.0, 100.0, DEFAULT_SEED)?;
//! let mut grid = expected.clone();
//!
//! local_mean_reference(&mut expected, 8);
//! local_mean_parallel(&mut grid, 8, 16)?;
//!
//! verify_match(&expected, &grid, EPSILON)?;
//! # Ok::<(), stencil_mean::StencilError>(())
//! ```
//!
//! For repeated runs or explicit worker counts, use the kernel types
//! directly ([`BlockedKernel`], [`VectorizedKernel`], [`ParallelKernel`]):
//! they validate the tiling once at construction and are then reusable.
//!
//! # Module contents
//!
//! - [`grid`]: 64-byte-aligned grid storage, seeded fills, transposition,
//!   approximate-equality validation
//! - [`kernels`]: the four kernel implementations and the shared clipped
//!   window arithmetic
//! - [`simd`]: the portable 4-lane `f32` vector the fast kernels build on
//! - [`error`]: the error taxonomy

mod api;
pub mod error;
pub mod grid;
pub mod kernels;
pub mod simd;

pub use api::{local_mean_blocked, local_mean_parallel, local_mean_reference, local_mean_simd};
pub use error::{Result, StencilError};
pub use grid::{verify_match, AlignedGrid, DEFAULT_SEED, EPSILON, GRID_ALIGN};
pub use kernels::{BlockedKernel, ParallelKernel, VectorizedKernel};
pub use simd::{F32x4, LANES};
