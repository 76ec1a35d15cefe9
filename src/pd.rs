use std::{fmt, str::FromStr};

use na::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    config::GainsConfig, error::ControlError, orientation::orientation_error, types::Float,
};

/// The two task-space PD tasks of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdMode {
    Position,
    Orientation,
}

impl fmt::Display for PdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdMode::Position => write!(f, "position"),
            PdMode::Orientation => write!(f, "orientation"),
        }
    }
}

impl FromStr for PdMode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" => Ok(PdMode::Position),
            "orientation" => Ok(PdMode::Orientation),
            other => Err(ControlError::InvalidMode(other.to_string())),
        }
    }
}

/// Task-space PD error of the position task:
///     kp * (x_des - x) + kd * (dx_des - dx)
pub fn position_pd(
    gains: &GainsConfig,
    x: &Vector3<Float>,
    x_desired: &Vector3<Float>,
    dx: &Vector3<Float>,
    dx_desired: &Vector3<Float>,
) -> Result<Vector3<Float>, ControlError> {
    let gains = gains.get(PdMode::Position)?;
    Ok(gains.kp * (x_desired - x) + gains.kd() * (dx_desired - dx))
}

/// Task-space PD error of the orientation task:
///     kp * e(q, q_des) + kd * (ω_des - ω)
/// where e is the rotation vector from [`orientation_error`].
pub fn orientation_pd(
    gains: &GainsConfig,
    q: &UnitQuaternion<Float>,
    q_desired: &UnitQuaternion<Float>,
    omega: &Vector3<Float>,
    omega_desired: &Vector3<Float>,
) -> Result<Vector3<Float>, ControlError> {
    let gains = gains.get(PdMode::Orientation)?;
    Ok(gains.kp * orientation_error(q, q_desired) + gains.kd() * (omega_desired - omega))
}

#[cfg(test)]
mod pd_tests {
    use na::vector;

    use crate::{
        assert_vec_close,
        config::{GainsConfig, TaskGains},
    };

    use super::*;

    fn gains() -> GainsConfig {
        GainsConfig::new(TaskGains::new(100.0, 1.0), TaskGains::new(50.0, 1.0))
    }

    #[test]
    fn position_pd_is_linear_in_errors() {
        // Arrange
        let x = vector![0.1, -0.2, 0.3];
        let x_des = vector![0.4, 0.0, 0.3];
        let dx = vector![0.5, 0.0, -1.0];
        let dx_des = vector![0.0, 0.0, 0.0];

        // Act
        let error = position_pd(&gains(), &x, &x_des, &dx, &dx_des).unwrap();

        // Assert
        let kd = 1.0 * 2.0 * (100.0 as Float).sqrt();
        let expected = 100.0 * (x_des - x) + kd * (dx_des - dx);
        assert_vec_close!(&error, &expected, 1e-12);

        let doubled = position_pd(&gains(), &x, &(x + 2.0 * (x_des - x)), &dx, &dx_des).unwrap();
        let position_part = doubled - error;
        assert_vec_close!(&position_part, &(100.0 * (x_des - x)), 1e-12);
    }

    #[test]
    fn orientation_pd_at_target_is_pure_damping() {
        let q = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.0);
        let omega = vector![0.0, 1.0, 0.0];

        let error = orientation_pd(&gains(), &q, &q, &omega, &Vector3::zeros()).unwrap();

        let kd = 2.0 * (50.0 as Float).sqrt();
        assert_vec_close!(&error, &(-kd * omega), 1e-9);
    }

    #[test]
    fn orientation_pd_scales_rotation_vector_by_kp() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2);
        let q_des = UnitQuaternion::identity();

        let error =
            orientation_pd(&gains(), &q, &q_des, &Vector3::zeros(), &Vector3::zeros()).unwrap();

        assert_vec_close!(&error, &vector![0.0, 0.0, 50.0 * 0.2], 1e-9);
    }

    #[test]
    fn missing_gains_fail_per_mode() {
        let gains = GainsConfig {
            position: None,
            orientation: Some(TaskGains::new(50.0, 1.0)),
        };
        let zero = Vector3::zeros();

        let result = position_pd(&gains, &zero, &zero, &zero, &zero);

        assert_eq!(result, Err(ControlError::InvalidGains(PdMode::Position)));
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!("position".parse::<PdMode>(), Ok(PdMode::Position));
        assert_eq!("orientation".parse::<PdMode>(), Ok(PdMode::Orientation));
        assert_eq!(
            "velocity".parse::<PdMode>(),
            Err(ControlError::InvalidMode("velocity".to_string()))
        );
    }
}
