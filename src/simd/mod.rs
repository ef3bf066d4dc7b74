//! Portable 4-wide `f32` vector operations.
//!
//! The vectorized kernels only need four operations over a 4-lane register:
//! load, store, lanewise add, and a horizontal reduction. [`F32x4`] exposes
//! exactly those, with one implementation per architecture:
//!
//! | Architecture | Backing |
//! |--------------|---------|
//! | x86_64 | SSE `__m128` (baseline on every x86_64 target) |
//! | aarch64 | NEON `float32x4_t` |
//! | other | `[f32; 4]` scalar fallback |
//!
//! Loads and stores are unaligned-safe: spans start at arbitrary offsets
//! inside a row, and only the grid allocation itself is 64-byte aligned.
//!
//! [`span_sum`] is the three-phase reduction both vectorized kernels are
//! built on: a scalar prologue until the running index is a multiple of
//! [`LANES`], a vector body consuming four elements per step, and a scalar
//! epilogue for the tail. The phase structure is what keeps the loop correct
//! for spans that neither start nor end on a lane boundary.

/// Number of `f32` lanes processed per vector operation.
pub const LANES: usize = 4;

#[cfg(target_arch = "x86_64")]
mod imp {
    use super::LANES;
    use core::arch::x86_64::{__m128, _mm_add_ps, _mm_loadu_ps, _mm_setzero_ps, _mm_storeu_ps};

    /// Four `f32` lanes backed by an SSE register.
    #[derive(Copy, Clone)]
    pub struct F32x4(__m128);

    impl F32x4 {
        /// All lanes zero.
        #[inline]
        pub fn zero() -> Self {
            Self(unsafe { _mm_setzero_ps() })
        }

        /// Unaligned load of the first four elements of `src`.
        #[inline]
        pub fn load(src: &[f32]) -> Self {
            assert!(src.len() >= LANES);
            Self(unsafe { _mm_loadu_ps(src.as_ptr()) })
        }

        /// Unaligned store into the first four elements of `dst`.
        #[inline]
        pub fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= LANES);
            unsafe { _mm_storeu_ps(dst.as_mut_ptr(), self.0) }
        }

        /// Sum of the four lanes.
        #[inline]
        pub fn reduce_sum(self) -> f32 {
            let mut lanes = [0.0f32; LANES];
            unsafe { _mm_storeu_ps(lanes.as_mut_ptr(), self.0) };
            (lanes[0] + lanes[1]) + (lanes[2] + lanes[3])
        }
    }

    impl std::ops::Add for F32x4 {
        type Output = Self;

        #[inline]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { _mm_add_ps(self.0, rhs.0) })
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod imp {
    use super::LANES;
    use core::arch::aarch64::{float32x4_t, vaddq_f32, vaddvq_f32, vdupq_n_f32, vld1q_f32, vst1q_f32};

    /// Four `f32` lanes backed by a NEON register.
    #[derive(Copy, Clone)]
    pub struct F32x4(float32x4_t);

    impl F32x4 {
        #[inline]
        pub fn zero() -> Self {
            Self(unsafe { vdupq_n_f32(0.0) })
        }

        #[inline]
        pub fn load(src: &[f32]) -> Self {
            assert!(src.len() >= LANES);
            Self(unsafe { vld1q_f32(src.as_ptr()) })
        }

        #[inline]
        pub fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= LANES);
            unsafe { vst1q_f32(dst.as_mut_ptr(), self.0) }
        }

        #[inline]
        pub fn reduce_sum(self) -> f32 {
            unsafe { vaddvq_f32(self.0) }
        }
    }

    impl std::ops::Add for F32x4 {
        type Output = Self;

        #[inline]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { vaddq_f32(self.0, rhs.0) })
        }
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod imp {
    use super::LANES;

    /// Scalar fallback with identical semantics to the vector backends.
    #[derive(Copy, Clone)]
    pub struct F32x4([f32; LANES]);

    impl F32x4 {
        #[inline]
        pub fn zero() -> Self {
            Self([0.0; LANES])
        }

        #[inline]
        pub fn load(src: &[f32]) -> Self {
            let mut lanes = [0.0; LANES];
            lanes.copy_from_slice(&src[..LANES]);
            Self(lanes)
        }

        #[inline]
        pub fn store(self, dst: &mut [f32]) {
            dst[..LANES].copy_from_slice(&self.0);
        }

        #[inline]
        pub fn reduce_sum(self) -> f32 {
            (self.0[0] + self.0[1]) + (self.0[2] + self.0[3])
        }
    }

    impl std::ops::Add for F32x4 {
        type Output = Self;

        #[inline]
        fn add(self, rhs: Self) -> Self {
            let mut lanes = [0.0; LANES];
            for (out, (a, b)) in lanes.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
                *out = a + b;
            }
            Self(lanes)
        }
    }
}

pub use imp::F32x4;

/// Sum `lane[start..=end]` with a scalar prologue, a 4-wide vector body and
/// a scalar epilogue.
///
/// The prologue consumes elements until the running index is a multiple of
/// [`LANES`], so the vector body always reads from lane-aligned offsets
/// within the row. The caller passes the full row (or transposed column)
/// slice; `start` and `end` are inclusive indices into it.
#[inline]
pub fn span_sum(lane: &[f32], start: usize, end: usize) -> f32 {
    debug_assert!(end < lane.len());
    let mut scalar = 0.0f32;
    let mut i = start;

    while i <= end && i % LANES != 0 {
        scalar += lane[i];
        i += 1;
    }

    let mut acc = F32x4::zero();
    while i + LANES - 1 <= end {
        acc = acc + F32x4::load(&lane[i..i + LANES]);
        i += LANES;
    }

    while i <= end {
        scalar += lane[i];
        i += 1;
    }

    scalar + acc.reduce_sum()
}

/// Copy one row, four lanes per store, with a scalar remainder loop for row
/// lengths not divisible by [`LANES`].
#[inline]
pub fn copy_row(dst: &mut [f32], src: &[f32]) {
    debug_assert_eq!(dst.len(), src.len());
    let len = dst.len();
    let mut y = 0;

    while y + LANES <= len {
        F32x4::load(&src[y..y + LANES]).store(&mut dst[y..y + LANES]);
        y += LANES;
    }
    while y < len {
        dst[y] = src[y];
        y += 1;
    }
}
