//! Load/multiply building blocks for the BF16 gemv kernels.
//!
//! Each helper loads a `Bf16x8` from memory (fully, or partially with
//! zero-filled lanes) and combines its two widened halves with F32 operands.
//! The `_n` variants take an element count and never read past it, which is
//! how the kernels handle row tails without a scalar cleanup loop.

use half::bf16;

use super::lanes::{Bf16x8, F32x4};

/// Partial load of `n` values, high (first) half widened.
#[inline(always)]
pub fn load_n_hi(src: &[bf16], n: usize) -> F32x4 {
    Bf16x8::load_n(src, n).widen_hi()
}

/// `inp[0] * hi(v) + inp[1] * lo(v)`.
#[inline(always)]
pub fn mult(inp: &[F32x4; 2], v: Bf16x8) -> F32x4 {
    (inp[0] * v.widen_hi()) + (inp[1] * v.widen_lo())
}

#[inline(always)]
pub fn load_mult(src: &[bf16], inp: &[F32x4; 2]) -> F32x4 {
    mult(inp, Bf16x8::load(src))
}

/// Widens eight BF16 values into `[hi, lo]`.
#[inline(always)]
pub fn load_vec2(src: &[bf16]) -> [F32x4; 2] {
    let v = Bf16x8::load(src);
    [v.widen_hi(), v.widen_lo()]
}

/// `acc[0] += x0 * hi(v); acc[1] += x0 * lo(v)`.
#[inline(always)]
pub fn mult2(x0: F32x4, v: Bf16x8, acc: &mut [F32x4; 2]) {
    acc[0] += x0 * v.widen_hi();
    acc[1] += x0 * v.widen_lo();
}

#[inline(always)]
pub fn load_mult2(x0: F32x4, src: &[bf16], acc: &mut [F32x4; 2]) {
    mult2(x0, Bf16x8::load(src), acc);
}

#[inline(always)]
pub fn load_n_mult(src: &[bf16], inp: &[F32x4; 2], n: usize) -> F32x4 {
    mult(inp, Bf16x8::load_n(src, n))
}

#[inline(always)]
pub fn load_n_vec2(src: &[bf16], n: usize) -> [F32x4; 2] {
    let v = Bf16x8::load_n(src, n);
    [v.widen_hi(), v.widen_lo()]
}

#[inline(always)]
pub fn load_n_mult2(x0: F32x4, src: &[bf16], n: usize, acc: &mut [F32x4; 2]) {
    mult2(x0, Bf16x8::load_n(src, n), acc);
}

/// `inp0 * load_n_hi(src, n)`. Meant for tails of at most four elements.
#[inline(always)]
pub fn load_n_hi_mult(src: &[bf16], inp0: F32x4, n: usize) -> F32x4 {
    inp0 * load_n_hi(src, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bf(vals: &[f32]) -> Vec<bf16> {
        vals.iter().copied().map(bf16::from_f32).collect()
    }

    fn ramp() -> Vec<bf16> {
        bf(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
    }

    #[test]
    fn test_load_n_hi() {
        let src = ramp();
        assert_eq!(load_n_hi(&src, 8), F32x4([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(load_n_hi(&src[..2], 2), F32x4([1.0, 2.0, 0.0, 0.0]));
        assert_eq!(load_n_hi(&src, 0), F32x4::ZERO);
    }

    #[test]
    fn test_mult() {
        let inp = [F32x4::splat(1.0), F32x4::splat(10.0)];
        let out = mult(&inp, Bf16x8::load(&ramp()));
        // [1,2,3,4] * 1 + [5,6,7,8] * 10
        assert_eq!(out, F32x4([51.0, 62.0, 73.0, 84.0]));
        assert_eq!(load_mult(&ramp(), &inp), out);
    }

    #[test]
    fn test_load_vec2() {
        let [hi, lo] = load_vec2(&ramp());
        assert_eq!(hi, F32x4([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(lo, F32x4([5.0, 6.0, 7.0, 8.0]));
    }

    #[test]
    fn test_mult2_accumulates() {
        let mut acc = [F32x4::splat(1.0), F32x4::splat(-1.0)];
        load_mult2(F32x4::splat(0.5), &ramp(), &mut acc);
        assert_eq!(acc[0], F32x4([1.5, 2.0, 2.5, 3.0]));
        assert_eq!(acc[1], F32x4([1.5, 2.0, 2.5, 3.0]));

        mult2(F32x4::splat(2.0), Bf16x8::ZERO, &mut acc);
        assert_eq!(acc[0], F32x4([1.5, 2.0, 2.5, 3.0]));
    }

    #[test]
    fn test_load_n_mult_ignores_tail() {
        // Only 5 valid elements; whatever follows in memory must not leak in.
        let mut src = ramp();
        src.extend(bf(&[100.0; 8]));
        let inp = [F32x4::splat(1.0), F32x4::splat(1.0)];
        let out = load_n_mult(&src, &inp, 5);
        assert_eq!(out, F32x4([6.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_load_n_vec2() {
        let [hi, lo] = load_n_vec2(&ramp()[..6], 6);
        assert_eq!(hi, F32x4([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(lo, F32x4([5.0, 6.0, 0.0, 0.0]));
    }

    #[test]
    fn test_load_n_mult2() {
        let mut acc = [F32x4::ZERO; 2];
        load_n_mult2(F32x4::splat(2.0), &ramp()[..7], 7, &mut acc);
        assert_eq!(acc[0], F32x4([2.0, 4.0, 6.0, 8.0]));
        assert_eq!(acc[1], F32x4([10.0, 12.0, 14.0, 0.0]));
    }

    #[test]
    fn test_load_n_hi_mult() {
        let out = load_n_hi_mult(&ramp()[..3], F32x4([1.0, -1.0, 2.0, 5.0]), 3);
        assert_eq!(out, F32x4([1.0, -2.0, 6.0, 0.0]));
    }
}
