#![allow(unsafe_code)]
use std::arch::x86_64::*;

/// Horizontally sums a `__m256`.
#[inline]
#[target_feature(enable = "avx")]
pub(crate) unsafe fn hsum_ps_avx(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let sum128 = _mm_add_ps(high, low);
    let sum64 = _mm_add_ps(sum128, _mm_movehl_ps(sum128, sum128));
    let sum32 = _mm_add_ss(sum64, _mm_shuffle_ps(sum64, sum64, 1));
    _mm_cvtss_f32(sum32)
}

/// Loads eight BF16 values (as raw `u16`) and widens them to F32.
#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn load_bf16x8_ps(ptr: *const u16) -> __m256 {
    let raw = _mm_loadu_si128(ptr as *const __m128i);
    _mm256_castsi256_ps(_mm256_slli_epi32(_mm256_cvtepu16_epi32(raw), 16))
}
