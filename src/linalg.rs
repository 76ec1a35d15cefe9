//! Dense linear-algebra helpers shared by the mass model and torque synthesis.

use na::{DMatrix, Dim, Matrix, RawStorage, SVD};

use crate::types::Float;

/// Damped pseudo-inverse through the SVD.
///
/// Singular values at or below `rcond * σ_max` are treated as zero, so the
/// directions they stand for get no authority instead of an unbounded gain.
/// A zero matrix, or a negative `rcond`, maps to a zero matrix of the
/// transposed shape.
pub fn pseudo_inverse(m: &DMatrix<Float>, rcond: Float) -> DMatrix<Float> {
    let svd = SVD::new(m.clone(), true, true);
    let cutoff = rcond * svd.singular_values.max();
    match svd.pseudo_inverse(cutoff) {
        Ok(pinv) => pinv,
        Err(_) => DMatrix::zeros(m.ncols(), m.nrows()),
    }
}

/// Select the given rows and columns of a matrix, in the given order.
pub fn select<R: Dim, C: Dim, S: RawStorage<Float, R, C>>(
    m: &Matrix<Float, R, C, S>,
    rows: &[usize],
    cols: &[usize],
) -> DMatrix<Float> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| m[(rows[i], cols[j])])
}

#[cfg(test)]
mod linalg_tests {
    use approx::assert_relative_eq;
    use na::{dmatrix, Matrix3};

    use super::*;

    #[test]
    fn pseudo_inverse_of_invertible_matrix_is_inverse() {
        let m = dmatrix![
            4.0, 1.0, 0.0;
            1.0, 3.0, 0.5;
            0.0, 0.5, 2.0
        ];

        let pinv = pseudo_inverse(&m, 1e-10);

        let inv = m.clone().try_inverse().unwrap();
        assert_relative_eq!(pinv, inv, epsilon = 1e-10);
    }

    #[test]
    fn small_singular_values_are_truncated() {
        // Arrange
        let m = DMatrix::from_diagonal(&na::dvector![10.0, 1e-4]);

        // Act
        let pinv = pseudo_inverse(&m, 1e-2);

        // Assert
        assert_relative_eq!(pinv[(0, 0)], 0.1, epsilon = 1e-12);
        assert_eq!(pinv[(1, 1)], 0.0);
    }

    #[test]
    fn pseudo_inverse_of_zero_matrix_is_zero() {
        let m = DMatrix::<Float>::zeros(2, 3);

        let pinv = pseudo_inverse(&m, 1e-2);

        assert_eq!(pinv.shape(), (3, 2));
        assert_eq!(pinv.norm(), 0.0);
    }

    #[test]
    fn negative_cutoff_gives_zero_matrix() {
        let m = DMatrix::<Float>::identity(2, 2);

        let pinv = pseudo_inverse(&m, -1.0);

        assert_eq!(pinv, DMatrix::zeros(2, 2));
    }

    #[test]
    fn pseudo_inverse_of_rectangular_matrix() {
        let m = dmatrix![
            1.0, 0.0;
            0.0, 2.0;
            0.0, 0.0
        ];

        let pinv = pseudo_inverse(&m, 1e-10);

        assert_relative_eq!(
            pinv,
            dmatrix![1.0, 0.0, 0.0; 0.0, 0.5, 0.0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn select_keeps_requested_order() {
        #[rustfmt::skip]
        let m = Matrix3::new(
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        );

        let selected = select(&m, &[2, 0], &[1, 2]);

        assert_eq!(selected, dmatrix![8.0, 9.0; 2.0, 3.0]);
    }
}
