//! Portable 128-bit lane types.
//!
//! `Bf16x8` models a register holding eight BF16 values, `F32x4` one holding
//! four F32 values. Lanes are always numbered in memory order, so "hi" means
//! the first four BF16 values loaded, regardless of target endianness.

use std::ops::{Add, AddAssign, Mul};

use half::bf16;

/// Widens a BF16 to F32 by placing its bits in the upper half of the word.
#[inline(always)]
pub fn bf16_to_f32(v: bf16) -> f32 {
    f32::from_bits((v.to_bits() as u32) << 16)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct F32x4(pub [f32; 4]);

impl F32x4 {
    pub const ZERO: F32x4 = F32x4([0.0; 4]);

    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        F32x4([v; 4])
    }

    /// Loads four contiguous values. Panics if `src` is shorter than 4.
    #[inline(always)]
    pub fn load(src: &[f32]) -> Self {
        F32x4([src[0], src[1], src[2], src[3]])
    }

    /// Loads `min(n, 4)` values and zero-fills the rest.
    #[inline(always)]
    pub fn load_n(src: &[f32], n: usize) -> Self {
        let mut out = [0.0; 4];
        let n = n.min(4);
        out[..n].copy_from_slice(&src[..n]);
        F32x4(out)
    }

    #[inline(always)]
    pub fn store(self, dst: &mut [f32]) {
        dst[..4].copy_from_slice(&self.0);
    }

    /// Stores the first `min(n, 4)` lanes.
    #[inline(always)]
    pub fn store_n(self, dst: &mut [f32], n: usize) {
        let n = n.min(4);
        dst[..n].copy_from_slice(&self.0[..n]);
    }

    /// Horizontal sum.
    #[inline(always)]
    pub fn sum(self) -> f32 {
        (self.0[0] + self.0[1]) + (self.0[2] + self.0[3])
    }
}

impl Add for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn add(self, rhs: F32x4) -> F32x4 {
        let (a, b) = (self.0, rhs.0);
        F32x4([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]])
    }
}

impl Mul for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn mul(self, rhs: F32x4) -> F32x4 {
        let (a, b) = (self.0, rhs.0);
        F32x4([a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]])
    }
}

impl AddAssign for F32x4 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: F32x4) {
        *self = *self + rhs;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bf16x8(pub [bf16; 8]);

impl Bf16x8 {
    pub const ZERO: Bf16x8 = Bf16x8([bf16::ZERO; 8]);

    /// Full 8-element load. Panics if `src` is shorter than 8.
    #[inline(always)]
    pub fn load(src: &[bf16]) -> Self {
        let mut out = [bf16::ZERO; 8];
        out.copy_from_slice(&src[..8]);
        Bf16x8(out)
    }

    /// Loads `min(n, 8)` values and zero-fills the remaining lanes.
    /// Never reads past `src[n - 1]`.
    #[inline(always)]
    pub fn load_n(src: &[bf16], n: usize) -> Self {
        let mut out = [bf16::ZERO; 8];
        let n = n.min(8);
        out[..n].copy_from_slice(&src[..n]);
        Bf16x8(out)
    }

    /// Lanes 0..4 widened to F32.
    #[inline(always)]
    pub fn widen_hi(self) -> F32x4 {
        let v = self.0;
        F32x4([bf16_to_f32(v[0]), bf16_to_f32(v[1]), bf16_to_f32(v[2]), bf16_to_f32(v[3])])
    }

    /// Lanes 4..8 widened to F32.
    #[inline(always)]
    pub fn widen_lo(self) -> F32x4 {
        let v = self.0;
        F32x4([bf16_to_f32(v[4]), bf16_to_f32(v[5]), bf16_to_f32(v[6]), bf16_to_f32(v[7])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bf(vals: &[f32]) -> Vec<bf16> {
        vals.iter().copied().map(bf16::from_f32).collect()
    }

    #[test]
    fn test_bf16_to_f32_matches_half() {
        for v in [0.0f32, -0.0, 1.0, -2.5, 3.140625, 1e-30, 6.5e37, f32::INFINITY] {
            let b = bf16::from_f32(v);
            assert_eq!(bf16_to_f32(b).to_bits(), b.to_f32().to_bits());
        }
    }

    #[test]
    fn test_widen_is_memory_order() {
        let src = bf(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let v = Bf16x8::load(&src);
        assert_eq!(v.widen_hi(), F32x4([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(v.widen_lo(), F32x4([5.0, 6.0, 7.0, 8.0]));
    }

    #[test]
    fn test_load_n_zero_fills() {
        let src = bf(&[1.0, 2.0, 3.0]);
        let v = Bf16x8::load_n(&src, 3);
        assert_eq!(v.widen_hi(), F32x4([1.0, 2.0, 3.0, 0.0]));
        assert_eq!(v.widen_lo(), F32x4::ZERO);
    }

    #[test]
    fn test_load_n_clamps_to_eight() {
        let src = bf(&[1.0; 12]);
        let v = Bf16x8::load_n(&src, 12);
        assert_eq!(v, Bf16x8::load(&src));
    }

    #[test]
    fn test_f32x4_partial_store() {
        let mut dst = [9.0f32; 4];
        F32x4([1.0, 2.0, 3.0, 4.0]).store_n(&mut dst, 2);
        assert_eq!(dst, [1.0, 2.0, 9.0, 9.0]);
        assert_eq!(F32x4::load_n(&dst, 3), F32x4([1.0, 2.0, 9.0, 0.0]));
    }

    #[test]
    fn test_f32x4_arith() {
        let a = F32x4([1.0, 2.0, 3.0, 4.0]);
        let mut acc = a * F32x4::splat(2.0);
        acc += a;
        assert_eq!(acc, F32x4([3.0, 6.0, 9.0, 12.0]));
        assert_eq!(acc.sum(), 30.0);
    }
}
