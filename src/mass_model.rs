use na::{DMatrix, Matrix6};
use tracing::debug;

use crate::{
    config::ConditioningConfig, error::ControlError, linalg::pseudo_inverse, types::Float,
};

/// How the task-space apparent inertia was inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionPath {
    Direct,
    PseudoInverse,
}

/// The 6 x 6 operational-space mass matrix of one control tick.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationalSpaceMass {
    pub matrix: Matrix6<Float>,
    pub path: InversionPath,
}

/// Compute the operational-space mass matrix
///     Λ = (J M⁻¹ Jᵀ)⁻¹
/// from the 6 x N task Jacobian and the N x N joint-space mass matrix.
///
/// Away from singularities (|det(J M⁻¹ Jᵀ)| >= singularity_threshold) the
/// direct inverse is used. Otherwise singular values below `rcond * σ_max` are
/// truncated, which bounds Λ near singular configurations at the cost of task
/// authority in the lost directions.
pub fn operational_space_mass(
    jacobian: &DMatrix<Float>,
    joint_mass_matrix: &DMatrix<Float>,
    conditioning: &ConditioningConfig,
) -> Result<OperationalSpaceMass, ControlError> {
    let n = jacobian.ncols();
    if jacobian.nrows() != 6 {
        return Err(ControlError::dimension_mismatch(
            "task jacobian",
            (6, n),
            jacobian.shape(),
        ));
    }
    if joint_mass_matrix.shape() != (n, n) {
        return Err(ControlError::dimension_mismatch(
            "joint mass matrix",
            (n, n),
            joint_mass_matrix.shape(),
        ));
    }

    let mass_inv = match joint_mass_matrix.clone().cholesky() {
        Some(chol) => chol.inverse(),
        None => pseudo_inverse(joint_mass_matrix, conditioning.rcond),
    };
    let task_inertia_inv = jacobian * mass_inv * jacobian.transpose();
    let task_inertia_inv = Matrix6::from_fn(|i, j| task_inertia_inv[(i, j)]);

    if task_inertia_inv.determinant().abs() >= conditioning.singularity_threshold {
        if let Some(matrix) = task_inertia_inv.try_inverse() {
            return Ok(OperationalSpaceMass {
                matrix,
                path: InversionPath::Direct,
            });
        }
    }

    debug!(
        det = task_inertia_inv.determinant(),
        "task-space inertia near singular, using pseudo-inverse"
    );
    let dynamic = DMatrix::from_fn(6, 6, |i, j| task_inertia_inv[(i, j)]);
    let pinv = pseudo_inverse(&dynamic, conditioning.rcond);
    Ok(OperationalSpaceMass {
        matrix: Matrix6::from_fn(|i, j| pinv[(i, j)]),
        path: InversionPath::PseudoInverse,
    })
}

#[cfg(test)]
mod mass_model_tests {
    use approx::assert_relative_eq;
    use na::{dmatrix, DMatrix};

    use super::*;

    /// Well-conditioned 6 x 6 Jacobian of a 6-DOF arm away from singularity.
    fn full_rank_jacobian() -> DMatrix<Float> {
        dmatrix![
            1.0, 0.2, 0.0, 0.1, 0.0, 0.0;
            0.0, 1.0, 0.3, 0.0, 0.1, 0.0;
            0.1, 0.0, 1.0, 0.0, 0.0, 0.2;
            0.0, 0.0, 0.0, 1.0, 0.1, 0.0;
            0.0, 0.1, 0.0, 0.0, 1.0, 0.1;
            0.2, 0.0, 0.0, 0.0, 0.0, 1.0
        ]
    }

    fn joint_mass() -> DMatrix<Float> {
        dmatrix![
            0.5, 0.05, 0.0, 0.0, 0.0, 0.0;
            0.05, 0.4, 0.02, 0.0, 0.0, 0.0;
            0.0, 0.02, 0.3, 0.0, 0.0, 0.0;
            0.0, 0.0, 0.0, 0.2, 0.01, 0.0;
            0.0, 0.0, 0.0, 0.01, 0.2, 0.0;
            0.0, 0.0, 0.0, 0.0, 0.0, 0.1
        ]
    }

    #[test]
    fn direct_path_inverts_task_inertia() {
        // Arrange
        let j = full_rank_jacobian();
        let m = joint_mass();

        // Act
        let mass = operational_space_mass(&j, &m, &ConditioningConfig::default()).unwrap();

        // Assert
        assert_eq!(mass.path, InversionPath::Direct);
        let task_inertia_inv = &j * m.clone().try_inverse().unwrap() * j.transpose();
        let product = DMatrix::from_fn(6, 6, |i, k| mass.matrix[(i, k)]) * task_inertia_inv;
        assert_relative_eq!(product, DMatrix::identity(6, 6), epsilon = 1e-9);
    }

    #[test]
    fn direct_and_pseudo_inverse_paths_agree_when_regular() {
        let j = full_rank_jacobian();
        let m = joint_mass();
        let forced_pinv = ConditioningConfig {
            singularity_threshold: Float::INFINITY,
            rcond: 1e-12,
        };

        let direct = operational_space_mass(&j, &m, &ConditioningConfig::default()).unwrap();
        let pinv = operational_space_mass(&j, &m, &forced_pinv).unwrap();

        assert_eq!(direct.path, InversionPath::Direct);
        assert_eq!(pinv.path, InversionPath::PseudoInverse);
        assert_relative_eq!(direct.matrix, pinv.matrix, epsilon = 1e-8, max_relative = 1e-8);
    }

    #[test]
    fn rank_deficient_jacobian_gives_bounded_mass() {
        // Arrange: a 3-DOF arm whose third joint duplicates the first
        let j = dmatrix![
            1.0, 0.0, 1.0;
            0.0, 1.0, 0.0;
            0.0, 0.0, 0.0;
            0.0, 0.0, 0.0;
            0.0, 0.0, 0.0;
            0.0, 0.0, 0.0
        ];
        let m = DMatrix::from_diagonal(&na::dvector![2.0, 1.0, 1.0]);

        // Act
        let mass = operational_space_mass(&j, &m, &ConditioningConfig::default()).unwrap();

        // Assert
        assert_eq!(mass.path, InversionPath::PseudoInverse);
        assert!(mass.matrix.iter().all(|x| x.is_finite()));
        assert!(mass.matrix.norm() < 10.0, "norm {}", mass.matrix.norm());
        // x direction: apparent inverse inertia 1/2 + 1/1
        assert_relative_eq!(mass.matrix[(0, 0)], 1.0 / 1.5, epsilon = 1e-9);
        assert_relative_eq!(mass.matrix[(1, 1)], 1.0, epsilon = 1e-9);
        assert_relative_eq!(mass.matrix[(2, 2)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn mass_matrix_is_symmetric() {
        let j = full_rank_jacobian();
        let m = joint_mass();

        let mass = operational_space_mass(&j, &m, &ConditioningConfig::default()).unwrap();

        assert_relative_eq!(mass.matrix, mass.matrix.transpose(), epsilon = 1e-9);
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let j = DMatrix::zeros(3, 2);
        let m = DMatrix::identity(2, 2);

        let result = operational_space_mass(&j, &m, &ConditioningConfig::default());

        assert!(matches!(
            result,
            Err(ControlError::DimensionMismatch { .. })
        ));
    }
}
