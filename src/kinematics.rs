use na::{DMatrix, DVector, UnitQuaternion, Vector3};

use crate::{
    error::ControlError,
    joint_space::JointSpace,
    linalg::{pseudo_inverse, select},
    physics::Physics,
    types::Float,
};

/// Cutoff used when inverting the actuator moment matrix.
pub const MOMENT_RCOND: Float = 1e-15;

/// Everything one control tick reads from the physics engine, restricted to
/// the controlled joint space.
///
/// Built fresh at the start of every tick and dropped at its end.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicsSnapshot {
    /// 6 x N site Jacobian. Rows 0-2 linear, rows 3-5 angular.
    pub jacobian: DMatrix<Float>,
    /// N x N joint-space mass matrix.
    pub joint_mass_matrix: DMatrix<Float>,
    pub joint_velocities: DVector<Float>,
    pub site_position: Vector3<Float>,
    pub site_orientation: UnitQuaternion<Float>,
    /// Bias forces c(q, v) at the controlled DOFs.
    pub bias_forces: DVector<Float>,
    /// Pseudo-inverse of the actuator moment, rows = controlled DOFs and
    /// columns = controlled actuators.
    pub actuator_moment_inv: DMatrix<Float>,
}

impl KinematicsSnapshot {
    /// Read the current engine state. Nothing in the engine is modified.
    pub fn capture<P: Physics + ?Sized>(
        physics: &P,
        joint_space: &JointSpace,
        site: &str,
    ) -> Result<Self, ControlError> {
        if !physics.has_site(site) {
            return Err(ControlError::UnknownSite(site.to_string()));
        }
        let nv = physics.nv();
        let nu = physics.nu();
        joint_space.check_bounds(nv, nu)?;
        let dofs = joint_space.dofs();

        let (jacp, jacr) = physics.site_jacobian(site);
        check_shape("linear site jacobian", &jacp, (3, nv))?;
        check_shape("angular site jacobian", &jacr, (3, nv))?;
        let mut jacobian = DMatrix::zeros(6, dofs.len());
        jacobian
            .view_mut((0, 0), (3, dofs.len()))
            .copy_from(&select(&jacp, &[0, 1, 2], dofs));
        jacobian
            .view_mut((3, 0), (3, dofs.len()))
            .copy_from(&select(&jacr, &[0, 1, 2], dofs));

        let mass_matrix = physics.mass_matrix();
        check_shape("mass matrix", &mass_matrix, (nv, nv))?;
        let joint_mass_matrix = select(&mass_matrix, dofs, dofs);

        let qvel = physics.joint_velocities();
        check_len("joint velocities", &qvel, nv)?;
        let joint_velocities = DVector::from_iterator(dofs.len(), dofs.iter().map(|&i| qvel[i]));

        let bias = physics.bias_forces();
        check_len("bias forces", &bias, nv)?;
        let bias_forces = DVector::from_iterator(dofs.len(), dofs.iter().map(|&i| bias[i]));

        let moment = physics.actuator_moment();
        check_shape("actuator moment", &moment, (nu, nv))?;
        let moment_inv = pseudo_inverse(&moment, MOMENT_RCOND); // nv x nu
        let actuator_moment_inv = select(&moment_inv, dofs, joint_space.actuators());

        Ok(KinematicsSnapshot {
            jacobian,
            joint_mass_matrix,
            joint_velocities,
            site_position: physics.site_position(site),
            site_orientation: physics.site_orientation(site),
            bias_forces,
            actuator_moment_inv,
        })
    }

    /// Linear velocity of the site, Jp * v.
    pub fn site_linear_velocity(&self) -> Vector3<Float> {
        let v = self.jacobian.rows(0, 3) * &self.joint_velocities;
        Vector3::new(v[0], v[1], v[2])
    }

    /// Angular velocity of the site, Jr * v.
    pub fn site_angular_velocity(&self) -> Vector3<Float> {
        let w = self.jacobian.rows(3, 3) * &self.joint_velocities;
        Vector3::new(w[0], w[1], w[2])
    }

    /// N, the number of controlled DOFs.
    pub fn dim(&self) -> usize {
        self.jacobian.ncols()
    }
}

fn check_shape(
    what: &'static str,
    m: &DMatrix<Float>,
    expected: (usize, usize),
) -> Result<(), ControlError> {
    if m.shape() != expected {
        return Err(ControlError::dimension_mismatch(what, expected, m.shape()));
    }
    Ok(())
}

fn check_len(what: &'static str, v: &DVector<Float>, expected: usize) -> Result<(), ControlError> {
    if v.len() != expected {
        return Err(ControlError::dimension_mismatch(
            what,
            (expected, 1),
            (v.len(), 1),
        ));
    }
    Ok(())
}
