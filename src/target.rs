use std::fmt;

use na::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{error::ControlError, types::Float};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GripperStatus {
    #[default]
    Open,
    Closed,
}

impl GripperStatus {
    pub fn toggled(self) -> Self {
        match self {
            GripperStatus::Open => GripperStatus::Closed,
            GripperStatus::Closed => GripperStatus::Open,
        }
    }
}

/// The target fields a control computation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Position,
    Orientation,
    LinearVelocity,
    AngularVelocity,
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetField::Position => "target position",
            TargetField::Orientation => "target orientation",
            TargetField::LinearVelocity => "target linear velocity",
            TargetField::AngularVelocity => "target angular velocity",
        };
        write!(f, "{}", name)
    }
}

/// End-effector target, filled in field by field by the caller.
///
/// Fields may be set in any order; [`TargetState::require`] checks all of them
/// are present when a control computation needs them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetState {
    pub position: Option<Vector3<Float>>,
    pub orientation: Option<UnitQuaternion<Float>>,
    pub linear_velocity: Option<Vector3<Float>>,
    pub angular_velocity: Option<Vector3<Float>>,
    pub gripper_status: GripperStatus,
}

/// A fully specified target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Vector3<Float>,
    pub orientation: UnitQuaternion<Float>,
    pub linear_velocity: Vector3<Float>,
    pub angular_velocity: Vector3<Float>,
    pub gripper_status: GripperStatus,
}

impl TargetState {
    pub fn new() -> Self {
        TargetState::default()
    }

    /// Target at a fixed pose with zero target velocities.
    pub fn at_rest(position: Vector3<Float>, orientation: UnitQuaternion<Float>) -> Self {
        TargetState {
            position: Some(position),
            orientation: Some(orientation),
            linear_velocity: Some(Vector3::zeros()),
            angular_velocity: Some(Vector3::zeros()),
            gripper_status: GripperStatus::Open,
        }
    }

    pub fn set_position(&mut self, position: Vector3<Float>) {
        self.position = Some(position);
    }

    pub fn set_orientation(&mut self, orientation: UnitQuaternion<Float>) {
        self.orientation = Some(orientation);
    }

    pub fn set_linear_velocity(&mut self, linear_velocity: Vector3<Float>) {
        self.linear_velocity = Some(linear_velocity);
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: Vector3<Float>) {
        self.angular_velocity = Some(angular_velocity);
    }

    pub fn set_gripper_status(&mut self, status: GripperStatus) {
        self.gripper_status = status;
    }

    /// Whether every field a control computation reads has been set.
    pub fn is_complete(&self) -> bool {
        self.require().is_ok()
    }

    /// The fully specified target, or the first missing field.
    pub fn require(&self) -> Result<Target, ControlError> {
        Ok(Target {
            position: self
                .position
                .ok_or(ControlError::MissingTarget(TargetField::Position))?,
            orientation: self
                .orientation
                .ok_or(ControlError::MissingTarget(TargetField::Orientation))?,
            linear_velocity: self
                .linear_velocity
                .ok_or(ControlError::MissingTarget(TargetField::LinearVelocity))?,
            angular_velocity: self
                .angular_velocity
                .ok_or(ControlError::MissingTarget(TargetField::AngularVelocity))?,
            gripper_status: self.gripper_status,
        })
    }
}
