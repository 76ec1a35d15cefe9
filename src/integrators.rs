use na::DVector;

use crate::types::Float;

/// Semi-implicit Euler integration
///     v' = v + vdot * dt
///     q' = q + v' * dt
/// Energy conserving for systems without velocity-dependent forces.
///
/// Ref: Drake Doc, https://drake.mit.edu/doxygen_cxx/classdrake_1_1systems_1_1_semi_explicit_euler_integrator.html
pub fn semi_implicit_euler_step(
    q: &DVector<Float>,
    v: &DVector<Float>,
    vdot: &DVector<Float>,
    dt: Float,
) -> (DVector<Float>, DVector<Float>) {
    let v_new = v + vdot * dt;
    let q_new = q + &v_new * dt;
    (q_new, v_new)
}
