//! F32 gemv kernels built from the `load` helpers.
//!
//! These run on any target and keep the register-blocked shape of the native
//! kernels: four columns per pass, eight rows per step, and partial loads for
//! the row tail instead of a scalar cleanup loop.

use half::bf16;

use super::assert_block;
use super::lanes::{bf16_to_f32, F32x4};
use super::load::{
    load_mult, load_mult2, load_n_hi_mult, load_n_mult, load_n_mult2, load_n_vec2, load_vec2,
};

const COLS: usize = 4;

#[inline(always)]
fn column(a: &[bf16], lda: usize, j: usize) -> &[bf16] {
    &a[j * lda..]
}

/// `y += sum_c xs[c] * cols[c]` over all of `y`.
#[inline(always)]
fn axpy_columns<const C: usize>(cols: [&[bf16]; C], xs: [F32x4; C], y: &mut [f32]) {
    let rows = y.len();
    let full = rows & !7;

    let mut i = 0;
    while i < full {
        let mut acc = [F32x4::load(&y[i..]), F32x4::load(&y[i + 4..])];
        for c in 0..C {
            load_mult2(xs[c], &cols[c][i..], &mut acc);
        }
        acc[0].store(&mut y[i..]);
        acc[1].store(&mut y[i + 4..]);
        i += 8;
    }

    let tail = rows - full;
    if tail > 4 {
        let mut acc = [F32x4::load(&y[i..]), F32x4::load_n(&y[i + 4..], tail - 4)];
        for c in 0..C {
            load_n_mult2(xs[c], &cols[c][i..], tail, &mut acc);
        }
        acc[0].store(&mut y[i..]);
        acc[1].store_n(&mut y[i + 4..], tail - 4);
    } else if tail > 0 {
        let mut acc = F32x4::load_n(&y[i..], tail);
        for c in 0..C {
            acc += load_n_hi_mult(&cols[c][i..], xs[c], tail);
        }
        acc.store_n(&mut y[i..], tail);
    }
}

/// Dot products of `C` columns against the same `x`.
#[inline(always)]
fn dot_columns<const C: usize>(cols: [&[bf16]; C], x: &[bf16]) -> [f32; C] {
    let rows = x.len();
    let full = rows & !7;
    let mut acc = [F32x4::ZERO; C];

    let mut i = 0;
    while i < full {
        // x is widened once per block and reused for every column.
        let inp = load_vec2(&x[i..]);
        for c in 0..C {
            acc[c] += load_mult(&cols[c][i..], &inp);
        }
        i += 8;
    }

    let tail = rows - full;
    if tail > 0 {
        let inp = load_n_vec2(&x[i..], tail);
        for c in 0..C {
            acc[c] += load_n_mult(&cols[c][i..], &inp, tail);
        }
    }

    acc.map(F32x4::sum)
}

/// `y += alpha * A * x` over `y.len()` rows and `x.len()` columns.
pub fn gemv_n_portable(a: &[bf16], lda: usize, x: &[bf16], alpha: f32, y: &mut [f32]) {
    assert_block(a, y.len(), x.len(), lda);
    if y.is_empty() {
        return;
    }
    let n = x.len();
    let mut j = 0;
    while j + COLS <= n {
        let cols = [
            column(a, lda, j),
            column(a, lda, j + 1),
            column(a, lda, j + 2),
            column(a, lda, j + 3),
        ];
        let xs = [
            F32x4::splat(alpha * bf16_to_f32(x[j])),
            F32x4::splat(alpha * bf16_to_f32(x[j + 1])),
            F32x4::splat(alpha * bf16_to_f32(x[j + 2])),
            F32x4::splat(alpha * bf16_to_f32(x[j + 3])),
        ];
        axpy_columns(cols, xs, y);
        j += COLS;
    }
    while j < n {
        axpy_columns([column(a, lda, j)], [F32x4::splat(alpha * bf16_to_f32(x[j]))], y);
        j += 1;
    }
}

/// `out[j] = alpha * dot(A[:, j], x)` over `out.len()` columns.
pub fn gemv_t_portable(a: &[bf16], lda: usize, x: &[bf16], alpha: f32, out: &mut [f32]) {
    assert_block(a, x.len(), out.len(), lda);
    let n = out.len();
    let mut j = 0;
    while j + COLS <= n {
        let cols = [
            column(a, lda, j),
            column(a, lda, j + 1),
            column(a, lda, j + 2),
            column(a, lda, j + 3),
        ];
        let sums = dot_columns(cols, x);
        for (o, s) in out[j..j + COLS].iter_mut().zip(sums) {
            *o = alpha * s;
        }
        j += COLS;
    }
    while j < n {
        let [sum] = dot_columns([column(a, lda, j)], x);
        out[j] = alpha * sum;
        j += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::kernels::scalar::{gemv_n_scalar, gemv_t_scalar};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_bf16(len: usize, seed: u64) -> Vec<bf16> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| bf16::from_f32(rng.gen_range(-1.0..1.0))).collect()
    }

    fn max_diff(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0f32, f32::max)
    }

    #[test]
    fn test_n_matches_scalar_all_tails() {
        // Rows 1..=19 cover every (8-block, tail) combination; columns 1..=9
        // cover the 4-column block plus remainders.
        for m in 1..=19 {
            for n in 1..=9 {
                let lda = m + 3;
                let a = random_bf16((n - 1) * lda + m, (m * 31 + n) as u64);
                let x = random_bf16(n, 7);
                let y0: Vec<f32> = (0..m).map(|i| i as f32 * 0.25 - 1.0).collect();

                let mut expected = y0.clone();
                gemv_n_scalar(&a, lda, &x, 1.5, &mut expected);
                let mut actual = y0.clone();
                gemv_n_portable(&a, lda, &x, 1.5, &mut actual);

                let diff = max_diff(&expected, &actual);
                assert!(diff < 1e-4, "m={} n={} diff={}", m, n, diff);
            }
        }
    }

    #[test]
    fn test_t_matches_scalar_all_tails() {
        for m in 1..=19 {
            for n in 1..=9 {
                let lda = m + 1;
                let a = random_bf16((n - 1) * lda + m, (m * 17 + n) as u64);
                let x = random_bf16(m, 11);

                let mut expected = vec![0.0f32; n];
                gemv_t_scalar(&a, lda, &x, -0.75, &mut expected);
                let mut actual = vec![f32::NAN; n];
                gemv_t_portable(&a, lda, &x, -0.75, &mut actual);

                let diff = max_diff(&expected, &actual);
                assert!(diff < 1e-4, "m={} n={} diff={}", m, n, diff);
            }
        }
    }

    #[test]
    fn test_n_leaves_rows_outside_block_untouched() {
        let a = random_bf16(6 * 3, 1);
        let x = random_bf16(3, 2);
        // Compute only the first 5 of 6 rows; the 6th y slot is out of range.
        let mut y = vec![0.0f32; 6];
        gemv_n_portable(&a, 6, &x, 1.0, &mut y[..5]);
        assert_eq!(y[5], 0.0);
    }

    #[test]
    fn test_t_zero_rows() {
        let mut out = vec![f32::NAN; 3];
        gemv_t_portable(&[], 0, &[], 2.0, &mut out);
        assert_eq!(out, vec![0.0; 3]);
    }
}
