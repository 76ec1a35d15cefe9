//! Operational space controller for an arm with a binary gripper.
//!
//! Each tick reads a [`KinematicsSnapshot`] of the arm, computes the
//! position and orientation PD errors in task space, maps them to joint
//! torques through the operational-space mass matrix and finally to actuator
//! commands. The gripper command is appended as the last element.

use itertools::izip;
use na::{DVector, UnitQuaternion, Vector3};
use tracing::{debug, info, warn};

use crate::{
    config::ControllerConfig,
    convergence::{check_convergence, ConvergenceStatus},
    error::ControlError,
    joint_space::JointSpace,
    kinematics::KinematicsSnapshot,
    mass_model::{operational_space_mass, InversionPath},
    pd::{orientation_pd, position_pd},
    physics::Physics,
    robot::{Arm, EndEffector},
    target::{GripperStatus, Target, TargetState},
    torque::{gripper_command, synthesize_torque},
    types::Float,
};

use super::{Controller, EpisodeReport, EpisodeState};

/// One computed command and how the task-space inertia was inverted for it.
struct Tick {
    command: DVector<Float>,
    path: InversionPath,
}

pub struct Osc<P: Physics> {
    physics: P,
    joint_space: JointSpace,
    site: String,
    /// Arm actuators in joint-space order, then the gripper actuator.
    command_actuators: Vec<usize>,
    config: ControllerConfig,
    target: TargetState,
}

impl<P: Physics> Osc<P> {
    /// Controller for `arm` carrying `gripper`, driving the engine `physics`.
    ///
    /// The controlled site is the arm's attachment site. The gripper must
    /// have exactly one actuator, distinct from the arm's.
    pub fn new(
        physics: P,
        arm: &impl Arm,
        gripper: &impl EndEffector,
        config: ControllerConfig,
    ) -> Result<Self, ControlError> {
        config.validate()?;

        let joint_space = JointSpace::from_arm(arm)?;
        joint_space.check_bounds(physics.nv(), physics.nu())?;

        let site = arm.attachment_site();
        if !physics.has_site(site) {
            return Err(ControlError::UnknownSite(site.to_string()));
        }

        let gripper_actuator = match gripper.actuators() {
            [actuator] => actuator.index,
            actuators => {
                return Err(ControlError::invalid_joint_space(format!(
                    "end-effector {} must have exactly one actuator, has {}",
                    gripper.name(),
                    actuators.len()
                )))
            }
        };
        if gripper_actuator >= physics.nu() {
            return Err(ControlError::invalid_joint_space(format!(
                "gripper actuator {} out of range for nu = {}",
                gripper_actuator,
                physics.nu()
            )));
        }
        if joint_space.actuators().contains(&gripper_actuator) {
            return Err(ControlError::invalid_joint_space(format!(
                "gripper actuator {} is also an arm actuator",
                gripper_actuator
            )));
        }

        let mut command_actuators = joint_space.actuators().to_vec();
        command_actuators.push(gripper_actuator);

        Ok(Osc {
            physics,
            joint_space,
            site: site.to_string(),
            command_actuators,
            config,
            target: TargetState::new(),
        })
    }

    pub fn target(&self) -> &TargetState {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut TargetState {
        &mut self.target
    }

    pub fn set_target_position(&mut self, position: Vector3<Float>) {
        self.target.set_position(position);
    }

    pub fn set_target_orientation(&mut self, orientation: UnitQuaternion<Float>) {
        self.target.set_orientation(orientation);
    }

    pub fn set_target_velocity(&mut self, linear_velocity: Vector3<Float>) {
        self.target.set_linear_velocity(linear_velocity);
    }

    pub fn set_target_angular_velocity(&mut self, angular_velocity: Vector3<Float>) {
        self.target.set_angular_velocity(angular_velocity);
    }

    pub fn set_gripper_status(&mut self, status: GripperStatus) {
        self.target.set_gripper_status(status);
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn joint_space(&self) -> &JointSpace {
        &self.joint_space
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn into_physics(self) -> P {
        self.physics
    }

    /// Command for the current engine state: one entry per arm actuator in
    /// joint-space order, then the gripper command. The engine is not touched.
    pub fn compute_control_output(&self) -> Result<DVector<Float>, ControlError> {
        let target = self.target.require()?;
        Ok(self.tick(&target)?.command)
    }

    /// Run control ticks until the site converges on the target or
    /// `duration` of simulated time has passed.
    ///
    /// The target and duration are checked before the first tick, so an
    /// incomplete target or a non-finite duration leaves the engine untouched.
    /// A duration <= 0 times out without ticking. An error in any tick aborts
    /// the episode.
    pub fn run_controller(&mut self, duration: Float) -> Result<EpisodeReport, ControlError> {
        let target = self.target.require()?;
        if !duration.is_finite() {
            return Err(ControlError::InvalidDuration(duration));
        }
        let start = self.physics.time();
        info!(
            duration,
            target = ?target.position,
            gripper = ?target.gripper_status,
            "starting episode"
        );

        let mut state = EpisodeState::Running;
        let mut ticks = 0;
        let mut last_path = None;
        let mut status = self.convergence_status(&target);
        while state == EpisodeState::Running {
            if self.physics.time() - start >= duration {
                state = EpisodeState::TimedOut;
                break;
            }

            let tick = self.tick(&target)?;
            self.apply(&tick.command);
            self.physics.step();
            ticks += 1;
            last_path = Some(tick.path);

            status = self.convergence_status(&target);
            debug!(
                tick = ticks,
                position_error = status.position_error,
                orientation_error = status.orientation_error,
                path = ?tick.path,
                "tick"
            );
            if status.converged {
                state = EpisodeState::Converged;
            }
        }

        let elapsed = self.physics.time() - start;
        match state {
            EpisodeState::Converged => info!(ticks, elapsed, "episode converged"),
            _ => warn!(
                ticks,
                elapsed,
                position_error = status.position_error,
                orientation_error = status.orientation_error,
                "episode timed out"
            ),
        }
        Ok(EpisodeReport::new(state, ticks, elapsed, &status, last_path))
    }

    fn tick(&self, target: &Target) -> Result<Tick, ControlError> {
        let snapshot = KinematicsSnapshot::capture(&self.physics, &self.joint_space, &self.site)?;
        let mass = operational_space_mass(
            &snapshot.jacobian,
            &snapshot.joint_mass_matrix,
            &self.config.conditioning,
        )?;

        let position = position_pd(
            &self.config.gains,
            &snapshot.site_position,
            &target.position,
            &snapshot.site_linear_velocity(),
            &target.linear_velocity,
        )?;
        let orientation = orientation_pd(
            &self.config.gains,
            &snapshot.site_orientation,
            &target.orientation,
            &snapshot.site_angular_velocity(),
            &target.angular_velocity,
        )?;
        let gripper = gripper_command(target.gripper_status, &self.config.gripper);

        Ok(Tick {
            command: synthesize_torque(&snapshot, &mass, &position, &orientation, gripper),
            path: mass.path,
        })
    }

    /// Scatter the command into the engine's control vector. Actuators outside
    /// the arm and gripper are commanded zero.
    fn apply(&mut self, command: &DVector<Float>) {
        let mut ctrl = DVector::zeros(self.physics.nu());
        for (&actuator, &u) in izip!(self.command_actuators.iter(), command.iter()) {
            ctrl[actuator] = u;
        }
        self.physics.set_control(&ctrl);
    }

    fn convergence_status(&self, target: &Target) -> ConvergenceStatus {
        check_convergence(
            &self.config.convergence,
            &self.physics.site_position(&self.site),
            &self.physics.site_orientation(&self.site),
            target,
        )
    }
}

impl<P: Physics> Controller for Osc<P> {
    fn control(&mut self) -> Result<DVector<Float>, ControlError> {
        let target = self.target.require()?;
        let tick = self.tick(&target)?;
        self.apply(&tick.command);
        Ok(tick.command)
    }
}
