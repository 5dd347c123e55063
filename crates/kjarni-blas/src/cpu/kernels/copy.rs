//! Strided operand copies used around the gemv kernels.
//!
//! The kernels only ever see contiguous `x` and `y`. These routines gather
//! strided BLAS vectors into scratch buffers (applying `beta` on the way in)
//! and scatter results back out.
//!
//! Increments are signed. A negative increment walks the vector from its far
//! end, so logical element `i` lives at `(n - 1 - i) * |inc|`. The increment
//! must be non-zero; the drivers reject zero before getting here.

use num_traits::{One, Zero};

use crate::accum::Accumulator;

/// Memory offsets of the `n` logical elements of a strided vector.
///
/// `strided_len(n, inc)` must not overflow; the copy routines check this.
#[inline]
pub fn strided_indices(n: usize, inc: isize) -> impl Iterator<Item = usize> {
    debug_assert!(inc != 0, "zero increment");
    let step = inc.unsigned_abs();
    let last = n.saturating_sub(1) * step;
    (0..n).map(move |i| if inc < 0 { last - i * step } else { i * step })
}

/// Number of storage elements spanned by `n` logical elements at `inc`, or
/// `None` if that span does not fit in `usize`.
#[inline]
pub fn strided_len(n: usize, inc: isize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    (n - 1).checked_mul(inc.unsigned_abs())?.checked_add(1)
}

#[inline]
#[track_caller]
fn assert_span(name: &str, len: usize, n: usize, inc: isize) {
    let fits = strided_len(n, inc).is_some_and(|need| len >= need);
    assert!(fits, "{} of {} elements cannot hold {} values at inc={}", name, len, n, inc);
}

/// Gathers `n` strided elements of `src` into the front of `dest`.
pub fn copy_x<T: Copy>(n: usize, src: &[T], dest: &mut [T], inc_src: isize) {
    assert_span("src", src.len(), n, inc_src);
    for (d, s) in dest[..n].iter_mut().zip(strided_indices(n, inc_src)) {
        *d = src[s];
    }
}

/// Gathers a strided `y` into a contiguous buffer, scaled by `beta`.
///
/// With `beta == 0` the source is never read: the buffer is zeroed, so
/// NaN or Inf left in `y` does not leak into the result.
pub fn copy_y_beta<T: Accumulator>(n: usize, src: &[T], dest: &mut [T], inc_src: isize, beta: T) {
    assert_span("src", src.len(), n, inc_src);
    let dest = &mut dest[..n];
    if beta.is_zero() {
        dest.fill(T::zero());
    } else if beta.is_one() {
        for (d, s) in dest.iter_mut().zip(strided_indices(n, inc_src)) {
            *d = src[s];
        }
    } else {
        for (d, s) in dest.iter_mut().zip(strided_indices(n, inc_src)) {
            *d = src[s] * beta;
        }
    }
}

/// Scatters a contiguous result into a strided `y`: `y = src + beta * y`.
///
/// `beta == 0` overwrites without reading `y`; `beta == 1` is a plain add.
pub fn copy_y<T: Accumulator>(n: usize, src: &[T], dest: &mut [T], inc_dest: isize, beta: T) {
    assert_span("dest", dest.len(), n, inc_dest);
    let src = &src[..n];
    if beta.is_zero() {
        for (&s, d) in src.iter().zip(strided_indices(n, inc_dest)) {
            dest[d] = s;
        }
    } else if beta.is_one() {
        for (&s, d) in src.iter().zip(strided_indices(n, inc_dest)) {
            dest[d] += s;
        }
    } else {
        for (&s, d) in src.iter().zip(strided_indices(n, inc_dest)) {
            dest[d] = s + beta * dest[d];
        }
    }
}

/// Scatters `n` contiguous values into a strided destination.
pub fn move_y<T: Copy>(n: usize, src: &[T], dest: &mut [T], inc_dest: isize) {
    assert_span("dest", dest.len(), n, inc_dest);
    for (&s, d) in src[..n].iter().zip(strided_indices(n, inc_dest)) {
        dest[d] = s;
    }
}
