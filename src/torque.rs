use na::{DVector, Vector3, Vector6};

use crate::{
    config::GripperActuation, kinematics::KinematicsSnapshot, mass_model::OperationalSpaceMass,
    target::GripperStatus, types::Float,
};

/// Actuator value of the binary gripper policy.
pub fn gripper_command(status: GripperStatus, actuation: &GripperActuation) -> Float {
    match status {
        GripperStatus::Open => actuation.open,
        GripperStatus::Closed => actuation.closed,
    }
}

/// Stack the position and orientation PD errors into one task-space error.
pub fn task_error(position_pd: &Vector3<Float>, orientation_pd: &Vector3<Float>) -> Vector6<Float> {
    let mut error = Vector6::zeros();
    error.fixed_rows_mut::<3>(0).copy_from(position_pd);
    error.fixed_rows_mut::<3>(3).copy_from(orientation_pd);
    error
}

/// Map the task-space PD error to an actuator command:
///     τ = Jᵀ Λ F + c
///     u = τ · B⁺
/// where B⁺ is the restricted inverse actuator moment. The gripper command is
/// appended, so the result has N + 1 entries.
pub fn synthesize_torque(
    snapshot: &KinematicsSnapshot,
    task_mass: &OperationalSpaceMass,
    position_pd: &Vector3<Float>,
    orientation_pd: &Vector3<Float>,
    gripper: Float,
) -> DVector<Float> {
    let n = snapshot.dim();
    let wrench = task_mass.matrix * task_error(position_pd, orientation_pd);

    let mut tau: DVector<Float> = snapshot.jacobian.transpose() * wrench;
    tau += &snapshot.bias_forces;

    let arm_command = snapshot.actuator_moment_inv.transpose() * tau;

    let mut command = DVector::zeros(n + 1);
    command.rows_mut(0, n).copy_from(&arm_command);
    command[n] = gripper;
    command
}

#[cfg(test)]
mod torque_tests {
    use approx::assert_relative_eq;
    use na::{dmatrix, dvector, vector, DMatrix, Matrix6, UnitQuaternion};

    use crate::mass_model::InversionPath;

    use super::*;

    /// Planar two-joint snapshot with a non-trivial actuator coupling.
    fn snapshot() -> KinematicsSnapshot {
        KinematicsSnapshot {
            jacobian: dmatrix![
                1.0, 0.5;
                0.0, 1.0;
                0.0, 0.0;
                0.0, 0.0;
                0.0, 0.0;
                1.0, 1.0
            ],
            joint_mass_matrix: DMatrix::identity(2, 2),
            joint_velocities: dvector![0.0, 0.0],
            site_position: vector![0.3, 0.1, 0.5],
            site_orientation: UnitQuaternion::identity(),
            bias_forces: dvector![1.0, -2.0],
            actuator_moment_inv: dmatrix![0.5, 0.0; 0.0, 0.25],
        }
    }

    fn identity_mass() -> OperationalSpaceMass {
        OperationalSpaceMass {
            matrix: Matrix6::identity(),
            path: InversionPath::Direct,
        }
    }

    #[test]
    fn output_has_one_gripper_entry() {
        let command = synthesize_torque(
            &snapshot(),
            &identity_mass(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            255.0,
        );

        assert_eq!(command.len(), 3);
        assert_eq!(command[2], 255.0);
    }

    #[test]
    fn zero_error_gives_mapped_bias() {
        let command = synthesize_torque(
            &snapshot(),
            &identity_mass(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            0.0,
        );

        assert_relative_eq!(command, dvector![0.5, -0.5, 0.0], epsilon = 1e-12);
    }

    #[test]
    fn task_error_maps_through_jacobian_transpose() {
        // Arrange
        let position_pd = vector![2.0, 0.0, 0.0];
        let orientation_pd = vector![0.0, 0.0, 1.0];

        // Act
        let command = synthesize_torque(
            &snapshot(),
            &identity_mass(),
            &position_pd,
            &orientation_pd,
            0.0,
        );

        // Assert
        // Jᵀ F = [1*2 + 1*1, 0.5*2 + 1*1] = [3, 2], plus bias [1, -2]
        let tau = dvector![4.0, 0.0];
        let expected = dvector![0.5 * tau[0], 0.25 * tau[1], 0.0];
        assert_relative_eq!(command, expected, epsilon = 1e-12);
    }

    #[test]
    fn gripper_policy_is_binary() {
        let actuation = GripperActuation::default();

        assert_eq!(gripper_command(GripperStatus::Open, &actuation), 0.0);
        assert_eq!(gripper_command(GripperStatus::Closed, &actuation), 255.0);
    }

    #[test]
    fn task_error_stacks_position_first() {
        let error = task_error(&vector![1.0, 2.0, 3.0], &vector![4.0, 5.0, 6.0]);

        assert_eq!(error, Vector6::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));
    }
}
