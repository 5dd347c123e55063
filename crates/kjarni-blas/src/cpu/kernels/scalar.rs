//! Scalar reference kernels.
//!
//! Hardware-agnostic and generic over the accumulator, so they also serve
//! the F64 path. Everything else is tested against these.

use half::bf16;

use crate::accum::Accumulator;
use crate::cpu::kernels::assert_block;

/// `y += alpha * A * x`, `A` column-major with leading dimension `lda`.
pub fn gemv_n_scalar<T: Accumulator>(a: &[bf16], lda: usize, x: &[bf16], alpha: T, y: &mut [T]) {
    let rows = y.len();
    assert_block(a, rows, x.len(), lda);
    for (j, &x_j) in x.iter().enumerate() {
        let scaled = alpha * T::from_bf16(x_j);
        let col = &a[j * lda..j * lda + rows];
        for (y_i, &a_ij) in y.iter_mut().zip(col) {
            *y_i += scaled * T::from_bf16(a_ij);
        }
    }
}

/// `out[j] = alpha * dot(A[:, j], x)` for each of `out.len()` columns.
pub fn gemv_t_scalar<T: Accumulator>(a: &[bf16], lda: usize, x: &[bf16], alpha: T, out: &mut [T]) {
    let rows = x.len();
    assert_block(a, rows, out.len(), lda);
    for (j, out_j) in out.iter_mut().enumerate() {
        let col = &a[j * lda..j * lda + rows];
        let sum = col
            .iter()
            .zip(x)
            .fold(T::zero(), |acc, (&a_ij, &x_i)| acc + T::from_bf16(a_ij) * T::from_bf16(x_i));
        *out_j = alpha * sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bf(vals: &[f32]) -> Vec<bf16> {
        vals.iter().copied().map(bf16::from_f32).collect()
    }

    // A = [[1, 2, 3],
    //      [4, 5, 6]]  stored column-major with lda = 3 (one padding row).
    fn padded_a() -> Vec<bf16> {
        bf(&[1.0, 4.0, -99.0, 2.0, 5.0, -99.0, 3.0, 6.0])
    }

    #[test]
    fn test_gemv_n_scalar() {
        let x = bf(&[1.0, 1.0, 2.0]);
        let mut y = vec![1.0f32, 0.0];
        gemv_n_scalar(&padded_a(), 3, &x, 2.0, &mut y);
        // A x = [9, 21]; y = 1*[1,0] + 2*[9,21]
        assert_eq!(y, vec![19.0, 42.0]);
    }

    #[test]
    fn test_gemv_t_scalar_f64() {
        let x = bf(&[1.0, -1.0]);
        let mut out = vec![f64::NAN; 3];
        gemv_t_scalar(&padded_a(), 3, &x, 0.5f64, &mut out);
        assert_eq!(out, vec![-1.5, -1.5, -1.5]);
    }

    #[test]
    fn test_empty_columns() {
        let mut y = vec![3.0f32; 2];
        gemv_n_scalar(&[], 2, &[], 1.0, &mut y);
        assert_eq!(y, vec![3.0, 3.0]);
    }
}
