use na::{UnitQuaternion, Vector3};

use crate::{
    config::ConvergenceThresholds, orientation::quaternion_distance, target::Target, types::Float,
};

/// Pose errors of the site against the target after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceStatus {
    pub position_error: Float,
    /// Angle of the minimal rotation between current and target orientation.
    pub orientation_error: Float,
    pub converged: bool,
}

/// Converged iff both errors are strictly below their thresholds.
/// Site velocity is not taken into account.
pub fn check_convergence(
    thresholds: &ConvergenceThresholds,
    position: &Vector3<Float>,
    orientation: &UnitQuaternion<Float>,
    target: &Target,
) -> ConvergenceStatus {
    let position_error = (position - target.position).norm();
    let orientation_error = quaternion_distance(orientation, &target.orientation);
    ConvergenceStatus {
        position_error,
        orientation_error,
        converged: position_error < thresholds.position_threshold
            && orientation_error < thresholds.orientation_threshold,
    }
}

#[cfg(test)]
mod convergence_tests {
    use na::vector;

    use crate::{assert_close, target::GripperStatus};

    use super::*;

    fn target_at(position: Vector3<Float>) -> Target {
        Target {
            position,
            orientation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            gripper_status: GripperStatus::Open,
        }
    }

    #[test]
    fn at_target_is_converged() {
        let target = target_at(vector![0.1, 0.2, 0.3]);

        let status = check_convergence(
            &ConvergenceThresholds::default(),
            &vector![0.1, 0.2, 0.3],
            &UnitQuaternion::identity(),
            &target,
        );

        assert!(status.converged);
        assert_close!(status.position_error, 0.0, 1e-12);
        assert_close!(status.orientation_error, 0.0, 1e-6);
    }

    #[test]
    fn error_equal_to_threshold_is_not_converged() {
        // Arrange
        let thresholds = ConvergenceThresholds {
            position_threshold: 0.5,
            orientation_threshold: 0.01,
        };
        let target = target_at(Vector3::zeros());

        // Act
        let status = check_convergence(
            &thresholds,
            &vector![0.5, 0.0, 0.0],
            &UnitQuaternion::identity(),
            &target,
        );

        // Assert
        assert_eq!(status.position_error, 0.5);
        assert!(!status.converged);
    }

    #[test]
    fn orientation_error_blocks_convergence() {
        let target = target_at(Vector3::zeros());
        let tilted = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.2);

        let status = check_convergence(
            &ConvergenceThresholds::default(),
            &Vector3::zeros(),
            &tilted,
            &target,
        );

        assert!(!status.converged);
        assert_close!(status.orientation_error, 0.2, 1e-9);
    }

    #[test]
    fn velocity_is_ignored() {
        let mut target = target_at(Vector3::zeros());
        target.linear_velocity = vector![10.0, 0.0, 0.0];

        let status = check_convergence(
            &ConvergenceThresholds::default(),
            &Vector3::zeros(),
            &UnitQuaternion::identity(),
            &target,
        );

        assert!(status.converged);
    }
}
