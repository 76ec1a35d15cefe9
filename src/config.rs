//! Controller configuration: PD gains, convergence thresholds, inversion
//! conditioning and gripper actuation values.
//!
//! Loading and composing configurations is left to the caller; these types only
//! derive `serde` so any format can be deserialized into them, and
//! [`ControllerConfig::validate`] checks the numeric invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::ControlError, pd::PdMode, types::Float};

/// Errors found while validating a [`ControllerConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{mode} gain {name} must be finite and >= 0, got {value}")]
    NegativeGain {
        mode: PdMode,
        name: &'static str,
        value: Float,
    },

    #[error("{name} must be finite and > 0, got {value}")]
    NonPositive { name: &'static str, value: Float },
}

/// Stiffness and damping ratio of one PD task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskGains {
    pub kp: Float,
    pub damping_ratio: Float,
}

impl TaskGains {
    pub fn new(kp: Float, damping_ratio: Float) -> Self {
        TaskGains { kp, damping_ratio }
    }

    /// Critical-damping parametrization of the derivative gain:
    ///     kd = ζ * 2 * sqrt(kp)
    pub fn kd(&self) -> Float {
        self.damping_ratio * 2.0 * self.kp.sqrt()
    }

    fn validate(&self, mode: PdMode) -> Result<(), ConfigError> {
        for (name, value) in [("kp", self.kp), ("damping_ratio", self.damping_ratio)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeGain { mode, name, value });
            }
        }
        Ok(())
    }
}

/// Gains per PD task. A task without gains cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GainsConfig {
    #[serde(default)]
    pub position: Option<TaskGains>,
    #[serde(default)]
    pub orientation: Option<TaskGains>,
}

impl GainsConfig {
    pub fn new(position: TaskGains, orientation: TaskGains) -> Self {
        GainsConfig {
            position: Some(position),
            orientation: Some(orientation),
        }
    }

    /// Gains of the given task, or `InvalidGains` if the task has none.
    pub fn get(&self, mode: PdMode) -> Result<&TaskGains, ControlError> {
        let gains = match mode {
            PdMode::Position => self.position.as_ref(),
            PdMode::Orientation => self.orientation.as_ref(),
        };
        gains.ok_or(ControlError::InvalidGains(mode))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceThresholds {
    /// Euclidean distance bound on the TCP position (m).
    pub position_threshold: Float,
    /// Bound on the angle of the relative rotation (rad).
    pub orientation_threshold: Float,
}

impl Default for ConvergenceThresholds {
    fn default() -> Self {
        ConvergenceThresholds {
            position_threshold: 0.01,
            orientation_threshold: 0.01,
        }
    }
}

/// Constants steering the inversion of the task-space apparent inertia.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditioningConfig {
    /// Below this |det(J M⁻¹ Jᵀ)| the pseudo-inverse is used instead of a direct inverse.
    pub singularity_threshold: Float,
    /// Singular values at or below `rcond * σ_max` are truncated to zero.
    pub rcond: Float,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        ConditioningConfig {
            singularity_threshold: 1e-2,
            rcond: 1e-2,
        }
    }
}

/// Actuator command values of a binary gripper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripperActuation {
    pub open: Float,
    pub closed: Float,
}

impl Default for GripperActuation {
    fn default() -> Self {
        GripperActuation {
            open: 0.0,
            closed: 255.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub gains: GainsConfig,
    #[serde(default)]
    pub convergence: ConvergenceThresholds,
    #[serde(default)]
    pub conditioning: ConditioningConfig,
    #[serde(default)]
    pub gripper: GripperActuation,
}

impl ControllerConfig {
    pub fn new(gains: GainsConfig, convergence: ConvergenceThresholds) -> Self {
        ControllerConfig {
            gains,
            convergence,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_conditioning(mut self, conditioning: ConditioningConfig) -> Self {
        self.conditioning = conditioning;
        self
    }

    #[must_use]
    pub fn with_gripper(mut self, gripper: GripperActuation) -> Self {
        self.gripper = gripper;
        self
    }

    /// Check gains are non-negative and thresholds/conditioning constants positive.
    ///
    /// Absent gains are not an error here; they are reported as `InvalidGains`
    /// when the corresponding PD term is computed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(gains) = &self.gains.position {
            gains.validate(PdMode::Position)?;
        }
        if let Some(gains) = &self.gains.orientation {
            gains.validate(PdMode::Orientation)?;
        }

        let positives = [
            ("position_threshold", self.convergence.position_threshold),
            ("orientation_threshold", self.convergence.orientation_threshold),
            ("singularity_threshold", self.conditioning.singularity_threshold),
            ("rcond", self.conditioning.rcond),
        ];
        for (name, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}
