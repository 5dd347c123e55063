#![allow(unsafe_code)]
pub mod copy;
pub mod lanes;
pub mod load;
pub mod portable;
pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

#[cfg(target_arch = "aarch64")]
pub(crate) mod aarch64;

use half::bf16;

use crate::config::KernelChoice;

/// A concrete kernel family, after resolving [`KernelChoice`] against the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Scalar,
    Portable,
    Native,
}

impl Kernel {
    pub fn select(choice: KernelChoice) -> Self {
        match choice {
            KernelChoice::Scalar => Kernel::Scalar,
            KernelChoice::Portable => Kernel::Portable,
            KernelChoice::Auto | KernelChoice::Native if native_available() => Kernel::Native,
            KernelChoice::Native => {
                log::debug!("[kjarni-blas] native kernels unavailable on this CPU, using portable");
                Kernel::Portable
            }
            KernelChoice::Auto => Kernel::Portable,
        }
    }
}

/// Whether this CPU can run the native SIMD kernels.
pub fn native_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// Storage span of a column-major `rows x cols` block with leading dimension
/// `lda`, i.e. `(cols - 1) * lda + rows`. `None` if it overflows `usize`.
pub fn block_len(rows: usize, cols: usize, lda: usize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        return Some(0);
    }
    (cols - 1).checked_mul(lda)?.checked_add(rows)
}

/// Panics unless `a` holds a `rows x cols` block at `lda`.
#[inline]
#[track_caller]
pub(crate) fn assert_block(a: &[bf16], rows: usize, cols: usize, lda: usize) {
    let fits = block_len(rows, cols, lda).is_some_and(|need| a.len() >= need);
    assert!(
        fits,
        "matrix of {} elements cannot hold {}x{} with lda={}",
        a.len(),
        rows,
        cols,
        lda
    );
}

/// Native N kernel, falling back to the portable one when unsupported.
pub(crate) fn gemv_n_native(a: &[bf16], lda: usize, x: &[bf16], alpha: f32, y: &mut [f32]) {
    // The SIMD kernels index through raw pointers.
    assert_block(a, y.len(), x.len(), lda);
    unsafe {
        #[cfg(target_arch = "x86_64")]
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return x86::bf16::gemv_n_bf16_avx2(a, lda, x, alpha, y);
        }
        #[cfg(target_arch = "aarch64")]
        if std::arch::is_aarch64_feature_detected!("neon") {
            return aarch64::bf16::gemv_n_bf16_neon(a, lda, x, alpha, y);
        }
    }
    portable::gemv_n_portable(a, lda, x, alpha, y);
}

/// Native T kernel, falling back to the portable one when unsupported.
pub(crate) fn gemv_t_native(a: &[bf16], lda: usize, x: &[bf16], alpha: f32, out: &mut [f32]) {
    assert_block(a, x.len(), out.len(), lda);
    unsafe {
        #[cfg(target_arch = "x86_64")]
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return x86::bf16::gemv_t_bf16_avx2(a, lda, x, alpha, out);
        }
        #[cfg(target_arch = "aarch64")]
        if std::arch::is_aarch64_feature_detected!("neon") {
            return aarch64::bf16::gemv_t_bf16_neon(a, lda, x, alpha, out);
        }
    }
    portable::gemv_t_portable(a, lda, x, alpha, out);
}
