//! Public, safe BLAS-style entry points for BF16 matrix-vector products.
//!
//! Computes `y = alpha * op(A) * x + beta * y` where `A` and `x` are BF16 and
//! `y`, `alpha`, `beta` are the accumulator type (F32 for `sbgemv`, F64 for
//! `dbgemv`).
//!
//! # Data flow
//!
//! The kernels only ever see contiguous vectors:
//!
//! - **NoTrans**: `x` is gathered with `copy_x`, `y` is gathered and scaled by
//!   `beta` with `copy_y_beta`, the N kernel accumulates `alpha * A * x` into
//!   that buffer, and `move_y` scatters it back.
//! - **Trans**: `x` is gathered, the T kernel writes `alpha * A^T * x` into a
//!   scratch buffer, and `copy_y` merges it into `y` as `tmp + beta * y`.
//!
//! # Parallelization
//!
//! When `m * n` reaches [`BlasConfig::parallel_threshold`] the output is split
//! into chunks (rows for NoTrans, columns for Trans) across the rayon pool.
//! Chunks are disjoint, so no synchronization is needed.

use std::borrow::Cow;

use half::bf16;
use num_traits::{One, Zero};
use rayon::prelude::*;

use crate::accum::Accumulator;
use crate::config::BlasConfig;
use crate::cpu::kernels::copy::{copy_x, copy_y, copy_y_beta, move_y, strided_len};
use crate::cpu::kernels::{block_len, Kernel};
use crate::error::{BlasError, BlasResult};
use crate::layout::{Layout, Transpose};

/// `y = alpha * op(A) * x + beta * y`, column-major, F32 accumulation.
///
/// Uses [`BlasConfig::global`] for kernel selection and parallelism.
#[allow(clippy::too_many_arguments)]
pub fn sbgemv(
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: f32,
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    incx: isize,
    beta: f32,
    y: &mut [f32],
    incy: isize,
) -> BlasResult<()> {
    gemv(
        BlasConfig::global(),
        Layout::ColMajor,
        trans,
        m,
        n,
        alpha,
        a,
        lda,
        x,
        incx,
        beta,
        y,
        incy,
    )
}

/// Same as [`sbgemv`] with F64 accumulation.
#[allow(clippy::too_many_arguments)]
pub fn dbgemv(
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: f64,
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    incx: isize,
    beta: f64,
    y: &mut [f64],
    incy: isize,
) -> BlasResult<()> {
    gemv(
        BlasConfig::global(),
        Layout::ColMajor,
        trans,
        m,
        n,
        alpha,
        a,
        lda,
        x,
        incx,
        beta,
        y,
        incy,
    )
}

/// Generic driver behind [`sbgemv`] and [`dbgemv`].
///
/// `m` and `n` are the dimensions of `A` as stored in `layout`. Argument
/// errors report the parameter position of the column-major interface:
/// `lda` is 6, `incx` is 8, `incy` is 11. The same positions are reported
/// when `lda` or an increment makes the operand span overflow `usize`.
///
/// Returns early without touching `y` when `m == 0`, `n == 0`, or
/// `alpha == 0 && beta == 1`.
#[allow(clippy::too_many_arguments)]
pub fn gemv<T: Accumulator>(
    config: &BlasConfig,
    layout: Layout,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    incx: isize,
    beta: T,
    y: &mut [T],
    incy: isize,
) -> BlasResult<()> {
    // A row-major matrix is the column-major storage of its transpose.
    let (m, n, trans) = match layout {
        Layout::ColMajor => (m, n, trans),
        Layout::RowMajor => (n, m, trans.flip()),
    };

    if lda < m.max(1) {
        return Err(BlasError::invalid(6, "lda", format!("must be >= max(1, {}), got {}", m, lda)));
    }
    if incx == 0 {
        return Err(BlasError::invalid(8, "incx", "must not be zero"));
    }
    if incy == 0 {
        return Err(BlasError::invalid(11, "incy", "must not be zero"));
    }

    if m == 0 || n == 0 {
        return Ok(());
    }

    let (len_x, len_y) = match trans {
        Transpose::NoTrans => (n, m),
        Transpose::Trans => (m, n),
    };
    let a_len = block_len(m, n, lda).ok_or_else(|| {
        BlasError::invalid(6, "lda", format!("{} columns at lda={} overflow usize", n, lda))
    })?;
    let x_len = strided_len(len_x, incx).ok_or_else(|| {
        BlasError::invalid(8, "incx", format!("{} elements at incx={} overflow usize", len_x, incx))
    })?;
    let y_len = strided_len(len_y, incy).ok_or_else(|| {
        BlasError::invalid(11, "incy", format!("{} elements at incy={} overflow usize", len_y, incy))
    })?;
    check_len("a", a.len(), a_len)?;
    check_len("x", x.len(), x_len)?;
    check_len("y", y.len(), y_len)?;

    if alpha.is_zero() && beta.is_one() {
        return Ok(());
    }

    let kernel = Kernel::select(config.kernel);
    log::trace!(
        "[kjarni-blas] gemv {:?} m={} n={} kernel={:?} incx={} incy={}",
        trans,
        m,
        n,
        kernel,
        incx,
        incy
    );

    let x_buf: Cow<[bf16]> = if incx == 1 {
        Cow::Borrowed(&x[..len_x])
    } else {
        let mut buf = vec![bf16::ZERO; len_x];
        copy_x(len_x, x, &mut buf, incx);
        Cow::Owned(buf)
    };

    match trans {
        Transpose::NoTrans => {
            let mut y_buf = vec![T::zero(); m];
            copy_y_beta(m, y, &mut y_buf, incy, beta);
            if !alpha.is_zero() {
                run_n(config, kernel, a, lda, &x_buf, alpha, &mut y_buf);
            }
            move_y(m, &y_buf, y, incy);
        }
        Transpose::Trans => {
            let mut tmp = vec![T::zero(); n];
            if !alpha.is_zero() {
                run_t(config, kernel, a, lda, &x_buf, alpha, &mut tmp);
            }
            copy_y(n, &tmp, y, incy, beta);
        }
    }

    Ok(())
}

fn check_len(name: &'static str, actual: usize, required: usize) -> BlasResult<()> {
    if actual < required {
        return Err(BlasError::BufferTooSmall { name, required, actual });
    }
    Ok(())
}

fn parallel(config: &BlasConfig, work: usize) -> bool {
    work >= config.parallel_threshold && rayon::current_num_threads() > 1
}

/// Chunk length for splitting `len` outputs across the pool. Rounded up to a
/// multiple of 8 so only the last chunk carries a kernel tail.
fn chunk_size(len: usize, min_chunk: usize) -> usize {
    let num_threads = rayon::current_num_threads();
    let per_thread = (len + num_threads - 1) / num_threads;
    (per_thread.max(min_chunk).max(1) + 7) & !7
}

fn run_n<T: Accumulator>(
    config: &BlasConfig,
    kernel: Kernel,
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    alpha: T,
    y: &mut [T],
) {
    if !parallel(config, y.len() * x.len()) {
        return T::gemv_n(kernel, a, lda, x, alpha, y);
    }

    // Each task owns a block of rows; row r0 of every column is a[r0 + j*lda].
    let chunk = chunk_size(y.len(), config.min_chunk);
    y.par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(chunk_idx, y_chunk)| {
            let r0 = chunk_idx * chunk;
            T::gemv_n(kernel, &a[r0..], lda, x, alpha, y_chunk);
        });
}

fn run_t<T: Accumulator>(
    config: &BlasConfig,
    kernel: Kernel,
    a: &[bf16],
    lda: usize,
    x: &[bf16],
    alpha: T,
    out: &mut [T],
) {
    if !parallel(config, out.len() * x.len()) {
        return T::gemv_t(kernel, a, lda, x, alpha, out);
    }

    // Each task owns a block of columns.
    let chunk = chunk_size(out.len(), config.min_chunk);
    out.par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let c0 = chunk_idx * chunk;
            T::gemv_t(kernel, &a[c0 * lda..], lda, x, alpha, out_chunk);
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_is_aligned() {
        for len in [1, 7, 8, 100, 4097] {
            let c = chunk_size(len, 1);
            assert_eq!(c % 8, 0);
            assert!(c >= 8);
        }
        assert!(chunk_size(10, 256) >= 256);
    }

    #[test]
    fn test_parallel_threshold() {
        let config = BlasConfig {
            parallel_threshold: 100,
            ..BlasConfig::default()
        };
        assert!(!parallel(&config, 99));
        assert_eq!(parallel(&config, 100), rayon::current_num_threads() > 1);
    }
}
