//! Error types for stencil kernels.

use thiserror::Error;

/// Errors that can occur while configuring or validating a stencil run.
#[derive(Debug, Error)]
pub enum StencilError {
    /// Grid edge length too small for a local mean.
    #[error("grid size {0} is too small: a local mean needs at least 2 cells per axis")]
    GridTooSmall(usize),

    /// Grid element count overflows the address space.
    #[error("grid size {0} overflows the address space")]
    GridTooLarge(usize),

    /// Grid size not divisible by the tile edge length.
    #[error("grid size {n} is not divisible by block size {block}")]
    BlockSize { n: usize, block: usize },

    /// Worker pool construction failed.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// An optimized kernel diverged from the reference output.
    #[error("grids diverge at ({x}, {y}): expected {expected}, got {actual} (epsilon {epsilon})")]
    Validation {
        x: usize,
        y: usize,
        expected: f32,
        actual: f32,
        epsilon: f32,
    },
}

/// Result type for stencil operations.
pub type Result<T> = std::result::Result<T, StencilError>;
