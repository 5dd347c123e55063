//! AVX2/FMA accelerated gemv kernels for BF16 matrices.
//!
//! This module is part of the `unsafe` kernel zone. The functions within are
//! called from the safe dispatchers in `cpu::kernels` after feature detection.

#![allow(unsafe_code)]
use std::arch::x86_64::*;

use half::bf16;

use super::common::{hsum_ps_avx, load_bf16x8_ps};

#[inline(always)]
unsafe fn widen(ptr: *const u16) -> f32 {
    f32::from_bits((*ptr as u32) << 16)
}

/// `out[j] = alpha * dot(A[:, j], x)` with `A` column-major.
///
/// # Safety
///
/// The caller must ensure AVX2 and FMA are available, and that
/// `a.len() >= (out.len() - 1) * lda + x.len()` whenever `out` is non-empty.
#[target_feature(enable = "avx2", enable = "fma")]
pub(crate) unsafe fn gemv_t_bf16_avx2(
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    alpha: f32,
    out: &mut [f32],
) {
    let rows = x.len();
    let a_ptr = a.as_ptr() as *const u16;
    let x_ptr = x.as_ptr() as *const u16;

    for (j, val) in out.iter_mut().enumerate() {
        let mut a_chunk_ptr = a_ptr.add(j * lda);
        let mut x_chunk_ptr = x_ptr;

        // Unrolled by 4 to hide FMA latency.
        let mut sum0 = _mm256_setzero_ps();
        let mut sum1 = _mm256_setzero_ps();
        let mut sum2 = _mm256_setzero_ps();
        let mut sum3 = _mm256_setzero_ps();

        let mut n = rows;
        while n >= 32 {
            _mm_prefetch(a_chunk_ptr.wrapping_add(128) as *const i8, _MM_HINT_T0);

            sum0 = _mm256_fmadd_ps(load_bf16x8_ps(x_chunk_ptr), load_bf16x8_ps(a_chunk_ptr), sum0);
            sum1 = _mm256_fmadd_ps(
                load_bf16x8_ps(x_chunk_ptr.add(8)),
                load_bf16x8_ps(a_chunk_ptr.add(8)),
                sum1,
            );
            sum2 = _mm256_fmadd_ps(
                load_bf16x8_ps(x_chunk_ptr.add(16)),
                load_bf16x8_ps(a_chunk_ptr.add(16)),
                sum2,
            );
            sum3 = _mm256_fmadd_ps(
                load_bf16x8_ps(x_chunk_ptr.add(24)),
                load_bf16x8_ps(a_chunk_ptr.add(24)),
                sum3,
            );

            a_chunk_ptr = a_chunk_ptr.add(32);
            x_chunk_ptr = x_chunk_ptr.add(32);
            n -= 32;
        }
        while n >= 8 {
            sum0 = _mm256_fmadd_ps(load_bf16x8_ps(x_chunk_ptr), load_bf16x8_ps(a_chunk_ptr), sum0);
            a_chunk_ptr = a_chunk_ptr.add(8);
            x_chunk_ptr = x_chunk_ptr.add(8);
            n -= 8;
        }

        sum0 = _mm256_add_ps(_mm256_add_ps(sum0, sum1), _mm256_add_ps(sum2, sum3));
        let mut sum = hsum_ps_avx(sum0);

        while n > 0 {
            sum += widen(a_chunk_ptr) * widen(x_chunk_ptr);
            a_chunk_ptr = a_chunk_ptr.add(1);
            x_chunk_ptr = x_chunk_ptr.add(1);
            n -= 1;
        }

        *val = alpha * sum;
    }
}

/// `y += alpha * A * x` with `A` column-major, four columns per pass.
///
/// # Safety
///
/// The caller must ensure AVX2 and FMA are available, and that
/// `a.len() >= (x.len() - 1) * lda + y.len()` whenever `x` is non-empty.
#[target_feature(enable = "avx2", enable = "fma")]
pub(crate) unsafe fn gemv_n_bf16_avx2(
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    alpha: f32,
    y: &mut [f32],
) {
    let rows = y.len();
    if rows == 0 {
        return;
    }
    let cols = x.len();
    let a_ptr = a.as_ptr() as *const u16;
    let x_ptr = x.as_ptr() as *const u16;
    let y_ptr = y.as_mut_ptr();

    let mut j = 0;
    while j + 4 <= cols {
        let c0 = a_ptr.add(j * lda);
        let c1 = a_ptr.add((j + 1) * lda);
        let c2 = a_ptr.add((j + 2) * lda);
        let c3 = a_ptr.add((j + 3) * lda);

        let s0 = alpha * widen(x_ptr.add(j));
        let s1 = alpha * widen(x_ptr.add(j + 1));
        let s2 = alpha * widen(x_ptr.add(j + 2));
        let s3 = alpha * widen(x_ptr.add(j + 3));
        let x0 = _mm256_set1_ps(s0);
        let x1 = _mm256_set1_ps(s1);
        let x2 = _mm256_set1_ps(s2);
        let x3 = _mm256_set1_ps(s3);

        let mut i = 0;
        while i + 8 <= rows {
            let mut acc = _mm256_loadu_ps(y_ptr.add(i));
            acc = _mm256_fmadd_ps(x0, load_bf16x8_ps(c0.add(i)), acc);
            acc = _mm256_fmadd_ps(x1, load_bf16x8_ps(c1.add(i)), acc);
            acc = _mm256_fmadd_ps(x2, load_bf16x8_ps(c2.add(i)), acc);
            acc = _mm256_fmadd_ps(x3, load_bf16x8_ps(c3.add(i)), acc);
            _mm256_storeu_ps(y_ptr.add(i), acc);
            i += 8;
        }
        while i < rows {
            let mut v = *y_ptr.add(i);
            v += s0 * widen(c0.add(i));
            v += s1 * widen(c1.add(i));
            v += s2 * widen(c2.add(i));
            v += s3 * widen(c3.add(i));
            *y_ptr.add(i) = v;
            i += 1;
        }
        j += 4;
    }

    while j < cols {
        let c0 = a_ptr.add(j * lda);
        let s0 = alpha * widen(x_ptr.add(j));
        let x0 = _mm256_set1_ps(s0);

        let mut i = 0;
        while i + 8 <= rows {
            let acc = _mm256_fmadd_ps(x0, load_bf16x8_ps(c0.add(i)), _mm256_loadu_ps(y_ptr.add(i)));
            _mm256_storeu_ps(y_ptr.add(i), acc);
            i += 8;
        }
        while i < rows {
            *y_ptr.add(i) += s0 * widen(c0.add(i));
            i += 1;
        }
        j += 1;
    }
}
