use std::collections::HashSet;

use crate::{error::ControlError, robot::Arm};

/// The controlled DOFs of the arm and the actuators driving them.
///
/// The order is fixed for the lifetime of a controller: every restricted
/// Jacobian, mass matrix and torque vector uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointSpace {
    dofs: Vec<usize>,
    actuators: Vec<usize>,
}

impl JointSpace {
    /// Joint space where DOF `dofs[i]` is driven by actuator `dofs[i]`.
    pub fn new(dofs: Vec<usize>) -> Result<Self, ControlError> {
        let actuators = dofs.clone();
        Self::with_actuators(dofs, actuators)
    }

    pub fn with_actuators(dofs: Vec<usize>, actuators: Vec<usize>) -> Result<Self, ControlError> {
        if dofs.is_empty() {
            return Err(ControlError::invalid_joint_space("no controlled joints"));
        }
        if dofs.len() != actuators.len() {
            return Err(ControlError::invalid_joint_space(format!(
                "{} joints but {} actuators",
                dofs.len(),
                actuators.len()
            )));
        }
        if let Some(dof) = first_duplicate(&dofs) {
            return Err(ControlError::invalid_joint_space(format!(
                "dof {} listed twice",
                dof
            )));
        }
        if let Some(actuator) = first_duplicate(&actuators) {
            return Err(ControlError::invalid_joint_space(format!(
                "actuator {} listed twice",
                actuator
            )));
        }
        Ok(JointSpace { dofs, actuators })
    }

    pub fn from_arm(arm: &impl Arm) -> Result<Self, ControlError> {
        let dofs = arm.joints().iter().map(|joint| joint.dof).collect();
        let actuators = arm.actuators().iter().map(|actuator| actuator.index).collect();
        Self::with_actuators(dofs, actuators)
    }

    /// Check the joint space fits an engine with `nv` DOFs and `nu` actuators.
    pub fn check_bounds(&self, nv: usize, nu: usize) -> Result<(), ControlError> {
        if let Some(dof) = self.dofs.iter().find(|&&dof| dof >= nv) {
            return Err(ControlError::invalid_joint_space(format!(
                "dof {} out of range for nv = {}",
                dof, nv
            )));
        }
        if let Some(actuator) = self.actuators.iter().find(|&&a| a >= nu) {
            return Err(ControlError::invalid_joint_space(format!(
                "actuator {} out of range for nu = {}",
                actuator, nu
            )));
        }
        Ok(())
    }

    /// N, the task's joint-space dimension.
    pub fn len(&self) -> usize {
        self.dofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dofs.is_empty()
    }

    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    pub fn actuators(&self) -> &[usize] {
        &self.actuators
    }
}

fn first_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = HashSet::new();
    indices.iter().copied().find(|index| !seen.insert(*index))
}

#[cfg(test)]
mod joint_space_tests {
    use crate::robot::SerialArm;

    use super::*;

    #[test]
    fn from_arm_keeps_joint_order() {
        let mut arm = SerialArm::with_dofs(3, "attachment");
        arm.joints[0].dof = 4;

        let space = JointSpace::from_arm(&arm).unwrap();

        assert_eq!(space.dofs(), &[4, 1, 2]);
        assert_eq!(space.actuators(), &[0, 1, 2]);
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(matches!(
            JointSpace::new(vec![]),
            Err(ControlError::InvalidJointSpace(_))
        ));
        assert!(matches!(
            JointSpace::new(vec![0, 2, 0]),
            Err(ControlError::InvalidJointSpace(_))
        ));
        assert!(matches!(
            JointSpace::with_actuators(vec![0, 1], vec![0]),
            Err(ControlError::InvalidJointSpace(_))
        ));
    }

    #[test]
    fn bounds_are_checked_against_engine() {
        let space = JointSpace::new(vec![0, 3]).unwrap();

        assert!(space.check_bounds(4, 4).is_ok());
        assert!(space.check_bounds(3, 4).is_err());
        assert!(space.check_bounds(4, 3).is_err());
    }
}
