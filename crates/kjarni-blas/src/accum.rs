//! Accumulator precision for the BF16 gemv family.
//!
//! `y` may be F32 (`sbgemv`) or F64 (`dbgemv`). The trait carries the BF16
//! widening and the kernel entry points, so the drivers stay generic while
//! F32 can still route to the SIMD kernels.

use std::fmt::Debug;
use std::ops::AddAssign;

use half::bf16;
use num_traits::Float;

use crate::cpu::kernels::{self, lanes::bf16_to_f32, scalar, Kernel};

pub trait Accumulator: Float + AddAssign + Debug + Send + Sync + 'static {
    fn from_bf16(v: bf16) -> Self;

    /// `y += alpha * A * x` for a block of `y.len()` rows.
    ///
    /// Column `j` of `A` starts at `a[j * lda]`; `x.len()` is the column count.
    ///
    /// # Panics
    ///
    /// Panics if `a` is shorter than `(x.len() - 1) * lda + y.len()`.
    fn gemv_n(_kernel: Kernel, a: &[bf16], lda: usize, x: &[bf16], alpha: Self, y: &mut [Self]) {
        scalar::gemv_n_scalar(a, lda, x, alpha, y);
    }

    /// `out = alpha * A^T * x` for a block of `out.len()` columns.
    ///
    /// `x.len()` is the row count.
    ///
    /// # Panics
    ///
    /// Panics if `a` is shorter than `(out.len() - 1) * lda + x.len()`.
    fn gemv_t(_kernel: Kernel, a: &[bf16], lda: usize, x: &[bf16], alpha: Self, out: &mut [Self]) {
        scalar::gemv_t_scalar(a, lda, x, alpha, out);
    }
}

impl Accumulator for f32 {
    #[inline(always)]
    fn from_bf16(v: bf16) -> Self {
        bf16_to_f32(v)
    }

    fn gemv_n(kernel: Kernel, a: &[bf16], lda: usize, x: &[bf16], alpha: f32, y: &mut [f32]) {
        match kernel {
            Kernel::Scalar => scalar::gemv_n_scalar(a, lda, x, alpha, y),
            Kernel::Portable => kernels::portable::gemv_n_portable(a, lda, x, alpha, y),
            Kernel::Native => kernels::gemv_n_native(a, lda, x, alpha, y),
        }
    }

    fn gemv_t(kernel: Kernel, a: &[bf16], lda: usize, x: &[bf16], alpha: f32, out: &mut [f32]) {
        match kernel {
            Kernel::Scalar => scalar::gemv_t_scalar(a, lda, x, alpha, out),
            Kernel::Portable => kernels::portable::gemv_t_portable(a, lda, x, alpha, out),
            Kernel::Native => kernels::gemv_t_native(a, lda, x, alpha, out),
        }
    }
}

// Double accumulation always takes the scalar path.
impl Accumulator for f64 {
    #[inline(always)]
    fn from_bf16(v: bf16) -> Self {
        bf16_to_f32(v) as f64
    }
}
