#![allow(unsafe_code)]
use std::arch::aarch64::*;

use half::bf16;

#[inline(always)]
unsafe fn widen(ptr: *const u16) -> f32 {
    f32::from_bits((*ptr as u32) << 16)
}

/// Widens eight BF16 values into two F32 registers, memory order.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn load_bf16x8(ptr: *const u16) -> (float32x4_t, float32x4_t) {
    let raw = vld1q_u16(ptr);
    let shift = vdupq_n_s32(16);
    let hi = vreinterpretq_f32_u32(vshlq_u32(vmovl_u16(vget_low_u16(raw)), shift));
    let lo = vreinterpretq_f32_u32(vshlq_u32(vmovl_high_u16(raw), shift));
    (hi, lo)
}

/// # Safety
///
/// NEON must be available and `a.len() >= (out.len() - 1) * lda + x.len()`
/// whenever `out` is non-empty.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn gemv_t_bf16_neon(
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
        let mut sum0 = vdupq_n_f32(0.0);
        let mut sum1 = vdupq_n_f32(0.0);
        let mut n = rows;

        while n >= 8 {
            let (x_hi, x_lo) = load_bf16x8(x_chunk_ptr);
            let (a_hi, a_lo) = load_bf16x8(a_chunk_ptr);
            sum0 = vfmaq_f32(sum0, x_hi, a_hi);
            sum1 = vfmaq_f32(sum1, x_lo, a_lo);

            a_chunk_ptr = a_chunk_ptr.add(8);
            x_chunk_ptr = x_chunk_ptr.add(8);
            n -= 8;
        }

        let mut sum = vaddvq_f32(vaddq_f32(sum0, sum1));
        while n > 0 {
            sum += widen(a_chunk_ptr) * widen(x_chunk_ptr);
            a_chunk_ptr = a_chunk_ptr.add(1);
            x_chunk_ptr = x_chunk_ptr.add(1);
            n -= 1;
        }
        *val = alpha * sum;
    }
}

/// # Safety
///
/// NEON must be available and `a.len() >= (x.len() - 1) * lda + y.len()`
/// whenever `x` is non-empty.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn gemv_n_bf16_neon(
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
    let a_ptr = a.as_ptr() as *const u16;
    let x_ptr = x.as_ptr() as *const u16;
    let y_ptr = y.as_mut_ptr();

    for j in 0..x.len() {
        let col = a_ptr.add(j * lda);
        let s = alpha * widen(x_ptr.add(j));
        let xv = vdupq_n_f32(s);

        let mut i = 0;
        while i + 8 <= rows {
            let (a_hi, a_lo) = load_bf16x8(col.add(i));
            let y_hi = vfmaq_f32(vld1q_f32(y_ptr.add(i)), xv, a_hi);
            let y_lo = vfmaq_f32(vld1q_f32(y_ptr.add(i + 4)), xv, a_lo);
            vst1q_f32(y_ptr.add(i), y_hi);
            vst1q_f32(y_ptr.add(i + 4), y_lo);
            i += 8;
        }
        while i < rows {
            *y_ptr.add(i) += s * widen(col.add(i));
            i += 1;
        }
    }
}
