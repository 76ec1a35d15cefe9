//! Interface to the physics engine that owns the rigid-body state.
//!
//! Conventions follow the usual joint-space equations of motion
//!     M(q) vdot + c(q, v) = τ
//! with `nv` velocity DOFs and `nu` actuators. The controller only reads
//! through `&self` methods; `set_control` and `step` are the only writes.

use na::{DMatrix, DVector, UnitQuaternion, Vector3};

use crate::types::Float;

pub trait Physics {
    /// Number of velocity degrees of freedom.
    fn nv(&self) -> usize;

    /// Number of actuators, i.e. the length of the control vector.
    fn nu(&self) -> usize;

    /// Full joint-space mass matrix M(q), nv x nv.
    fn mass_matrix(&self) -> DMatrix<Float>;

    /// Whether a site with this name exists. Site queries may panic on an
    /// unknown name, so callers check this first.
    fn has_site(&self, site: &str) -> bool;

    /// Site Jacobian as (jacp, jacr), each 3 x nv, expressed in world frame.
    fn site_jacobian(&self, site: &str) -> (DMatrix<Float>, DMatrix<Float>);

    /// Bias forces c(q, v): gravity, Coriolis and centrifugal terms, length nv.
    fn bias_forces(&self) -> DVector<Float>;

    /// Actuator moment matrix, nu x nv. Joint force = momentᵀ * actuator force.
    fn actuator_moment(&self) -> DMatrix<Float>;

    /// World position of a site.
    fn site_position(&self, site: &str) -> Vector3<Float>;

    /// World orientation of a site.
    fn site_orientation(&self, site: &str) -> UnitQuaternion<Float>;

    /// Joint velocity vector v, length nv.
    fn joint_velocities(&self) -> DVector<Float>;

    /// Write the actuator command vector. May panic unless its length is nu.
    fn set_control(&mut self, ctrl: &DVector<Float>);

    /// Advance the simulation by one integration step.
    fn step(&mut self);

    /// Current simulated time.
    fn time(&self) -> Float;
}

impl<P: Physics + ?Sized> Physics for &mut P {
    fn nv(&self) -> usize {
        (**self).nv()
    }

    fn nu(&self) -> usize {
        (**self).nu()
    }

    fn mass_matrix(&self) -> DMatrix<Float> {
        (**self).mass_matrix()
    }

    fn has_site(&self, site: &str) -> bool {
        (**self).has_site(site)
    }

    fn site_jacobian(&self, site: &str) -> (DMatrix<Float>, DMatrix<Float>) {
        (**self).site_jacobian(site)
    }

    fn bias_forces(&self) -> DVector<Float> {
        (**self).bias_forces()
    }

    fn actuator_moment(&self) -> DMatrix<Float> {
        (**self).actuator_moment()
    }

    fn site_position(&self, site: &str) -> Vector3<Float> {
        (**self).site_position(site)
    }

    fn site_orientation(&self, site: &str) -> UnitQuaternion<Float> {
        (**self).site_orientation(site)
    }

    fn joint_velocities(&self) -> DVector<Float> {
        (**self).joint_velocities()
    }

    fn set_control(&mut self, ctrl: &DVector<Float>) {
        (**self).set_control(ctrl)
    }

    fn step(&mut self) {
        (**self).step()
    }

    fn time(&self) -> Float {
        (**self).time()
    }
}
