//! Descriptions of the arm and the hand attached to it.
//!
//! These only name things inside the physics engine: which DOFs the arm owns,
//! which actuators drive them and which site is the tool center point.

use crate::{config::GripperActuation, types::Float};

#[derive(Debug, Clone, PartialEq)]
pub struct JointDescriptor {
    pub name: String,
    /// Address of the joint's DOF in the engine's velocity vector.
    pub dof: usize,
}

impl JointDescriptor {
    pub fn new(name: &str, dof: usize) -> Self {
        JointDescriptor {
            name: name.to_string(),
            dof,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorDescriptor {
    pub name: String,
    /// Index of the actuator in the engine's control vector.
    pub index: usize,
    /// Force limits (min, max), if the actuator is force limited.
    pub force_range: Option<(Float, Float)>,
}

impl ActuatorDescriptor {
    pub fn new(name: &str, index: usize) -> Self {
        ActuatorDescriptor {
            name: name.to_string(),
            index,
            force_range: None,
        }
    }

    pub fn with_force_range(mut self, min: Float, max: Float) -> Self {
        self.force_range = Some((min, max));
        self
    }
}

pub trait Arm {
    /// Arm joints, in control order.
    fn joints(&self) -> &[JointDescriptor];

    /// Actuators of the arm joints, in the same order as `joints`.
    fn actuators(&self) -> &[ActuatorDescriptor];

    /// Site the end-effector is mounted on. This is the controlled site.
    fn attachment_site(&self) -> &str;
}

pub trait EndEffector {
    fn name(&self) -> &str;
    fn joints(&self) -> &[JointDescriptor];
    fn actuators(&self) -> &[ActuatorDescriptor];
    fn tool_center_point(&self) -> &str;
}

/// Plain-data arm description.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialArm {
    pub joints: Vec<JointDescriptor>,
    pub actuators: Vec<ActuatorDescriptor>,
    pub attachment_site: String,
}

impl SerialArm {
    pub fn new(
        joints: Vec<JointDescriptor>,
        actuators: Vec<ActuatorDescriptor>,
        attachment_site: &str,
    ) -> Self {
        SerialArm {
            joints,
            actuators,
            attachment_site: attachment_site.to_string(),
        }
    }

    /// Arm whose i-th joint sits at DOF i and is driven by actuator i.
    pub fn with_dofs(n: usize, attachment_site: &str) -> Self {
        let joints = (0..n)
            .map(|i| JointDescriptor::new(&format!("joint{}", i + 1), i))
            .collect();
        let actuators = (0..n)
            .map(|i| ActuatorDescriptor::new(&format!("actuator{}", i + 1), i))
            .collect();
        SerialArm::new(joints, actuators, attachment_site)
    }
}

impl Arm for SerialArm {
    fn joints(&self) -> &[JointDescriptor] {
        &self.joints
    }

    fn actuators(&self) -> &[ActuatorDescriptor] {
        &self.actuators
    }

    fn attachment_site(&self) -> &str {
        &self.attachment_site
    }
}

/// Robotiq 2-finger 85 adaptive gripper.
///
/// One tendon-driven finger actuator, commanded with 0 (open) to 255 (closed).
#[derive(Debug, Clone, PartialEq)]
pub struct Robotiq2F85 {
    joints: Vec<JointDescriptor>,
    actuators: Vec<ActuatorDescriptor>,
    tool_center_point: String,
}

impl Robotiq2F85 {
    pub const NAME: &'static str = "robotiq_2f85";
    pub const TCP_SITE: &'static str = "pinch";
    pub const ACTUATOR: &'static str = "fingers_actuator";
    pub const FORCE_RANGE: (Float, Float) = (-1.5, 1.5);
    pub const OPEN: Float = 0.0;
    pub const CLOSED: Float = 255.0;

    /// Hand whose finger joint sits at `finger_dof` and whose actuator has
    /// index `actuator_index` in the engine.
    pub fn new(finger_dof: usize, actuator_index: usize) -> Self {
        let (min, max) = Self::FORCE_RANGE;
        Robotiq2F85 {
            joints: vec![JointDescriptor::new("right_driver_joint", finger_dof)],
            actuators: vec![
                ActuatorDescriptor::new(Self::ACTUATOR, actuator_index).with_force_range(min, max)
            ],
            tool_center_point: Self::TCP_SITE.to_string(),
        }
    }

    /// The actuation values for commanding this hand.
    pub fn actuation(&self) -> GripperActuation {
        GripperActuation {
            open: Self::OPEN,
            closed: Self::CLOSED,
        }
    }
}

impl EndEffector for Robotiq2F85 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn joints(&self) -> &[JointDescriptor] {
        &self.joints
    }

    fn actuators(&self) -> &[ActuatorDescriptor] {
        &self.actuators
    }

    fn tool_center_point(&self) -> &str {
        &self.tool_center_point
    }
}
