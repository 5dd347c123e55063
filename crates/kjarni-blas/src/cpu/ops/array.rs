//! `ndarray` front end for the BF16 gemv drivers.
//!
//! Picks the storage order from the array's strides so the common cases
//! (C-contiguous and Fortran-contiguous matrices) run without a copy.

use half::bf16;
use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1};

use crate::config::BlasConfig;
use crate::cpu::ops::gemv::gemv;
use crate::error::{BlasError, BlasResult};
use crate::layout::{Layout, Transpose};

/// `y = alpha * A * x + beta * y` for a BF16 matrix of shape `[m, n]`.
///
/// # Errors
///
/// Returns [`BlasError::ShapeMismatch`] if `x.len() != n` or `y.len() != m`.
pub fn gemv_bf16(
    alpha: f32,
    a: &ArrayView2<bf16>,
    x: &ArrayView1<bf16>,
    beta: f32,
    y: &mut ArrayViewMut1<f32>,
) -> BlasResult<()> {
    let (m, n) = a.dim();
    if x.len() != n {
        return Err(BlasError::ShapeMismatch { name: "x", expected: n, actual: x.len() });
    }
    if y.len() != m {
        return Err(BlasError::ShapeMismatch { name: "y", expected: m, actual: y.len() });
    }

    let a_owned: Vec<bf16>;
    let (layout, a_slice, lda) = if let Some(s) = a.as_slice() {
        (Layout::RowMajor, s, n.max(1))
    } else if let (true, Some(s)) = (a.t().is_standard_layout(), a.as_slice_memory_order()) {
        (Layout::ColMajor, s, m.max(1))
    } else {
        a_owned = a.iter().copied().collect();
        (Layout::RowMajor, &a_owned[..], n.max(1))
    };

    let x_owned: Vec<bf16>;
    let x_slice = match x.as_slice() {
        Some(s) => s,
        None => {
            x_owned = x.iter().copied().collect();
            &x_owned[..]
        }
    };

    let config = BlasConfig::global();
    if let Some(y_slice) = y.as_slice_mut() {
        return gemv(
            config, layout, Transpose::NoTrans, m, n, alpha, a_slice, lda, x_slice, 1, beta,
            y_slice, 1,
        );
    }

    let mut y_buf: Vec<f32> = y.iter().copied().collect();
    gemv(
        config, layout, Transpose::NoTrans, m, n, alpha, a_slice, lda, x_slice, 1, beta,
        &mut y_buf, 1,
    )?;
    for (dst, src) in y.iter_mut().zip(y_buf) {
        *dst = src;
    }
    Ok(())
}

/// Computes `A * x` into a fresh vector.
pub fn matvec_bf16(a: &ArrayView2<bf16>, x: &ArrayView1<bf16>) -> BlasResult<Array1<f32>> {
    let mut y = Array1::<f32>::zeros(a.nrows());
    gemv_bf16(1.0, a, x, 0.0, &mut y.view_mut())?;
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, s, Array2, ShapeBuilder};

    fn to_bf16(a: &Array2<f32>) -> Array2<bf16> {
        a.mapv(bf16::from_f32)
    }

    #[test]
    fn test_matvec_row_major() {
        let a = to_bf16(&arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
        let x = arr1(&[1.0f32, 0.0, -1.0]).mapv(bf16::from_f32);
        let y = matvec_bf16(&a.view(), &x.view()).unwrap();
        assert_eq!(y, arr1(&[-2.0, -2.0]));
    }

    #[test]
    fn test_matvec_col_major_matches_row_major() {
        let data: Vec<f32> = (0..12).map(|i| i as f32 * 0.5).collect();
        let a_c = to_bf16(&Array2::from_shape_vec((3, 4), data.clone()).unwrap());
        let a_f = to_bf16(&Array2::from_shape_vec((3, 4).f(), data).unwrap());
        let a_f_as_c = a_f.as_standard_layout().into_owned();
        let x = arr1(&[1.0f32, -1.0, 2.0, 0.5]).mapv(bf16::from_f32);

        let y_c = matvec_bf16(&a_f_as_c.view(), &x.view()).unwrap();
        let y_f = matvec_bf16(&a_f.view(), &x.view()).unwrap();
        assert_eq!(y_c, y_f);
        assert_eq!(y_c.len(), a_c.nrows());
    }

    #[test]
    fn test_strided_operands() {
        let big = to_bf16(&Array2::from_shape_fn((6, 6), |(i, j)| (i * 6 + j) as f32));
        // Every other row and column: neither C- nor F-contiguous.
        let a = big.slice(s![..;2, ..;2]);
        let x_full = arr1(&[1.0f32, 9.0, 1.0, 9.0, 1.0, 9.0]).mapv(bf16::from_f32);
        let x = x_full.slice(s![..;2]);

        let mut y_full = arr1(&[1.0f32, -5.0, 1.0, -5.0, 1.0, -5.0]);
        {
            let mut y = y_full.slice_mut(s![..;2]);
            gemv_bf16(1.0, &a, &x, 2.0, &mut y).unwrap();
        }
        // Row sums of the sampled matrix: rows 0, 2, 4 with columns 0, 2, 4.
        assert_eq!(y_full, arr1(&[8.0, -5.0, 44.0, -5.0, 80.0, -5.0]));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<bf16>::zeros((2, 3));
        let x = Array1::<bf16>::zeros(2);
        match matvec_bf16(&a.view(), &x.view()) {
            Err(BlasError::ShapeMismatch { name, expected, actual }) => {
                assert_eq!((name, expected, actual), ("x", 3, 2));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_empty_matrix() {
        let a = Array2::<bf16>::zeros((0, 3));
        let x = Array1::<bf16>::zeros(3);
        let y = matvec_bf16(&a.view(), &x.view()).unwrap();
        assert_eq!(y.len(), 0);
    }
}
