use na::{Quaternion, UnitQuaternion, Vector3};

use crate::{types::Float, TWO_PI};

/// Rotation vector of the error quaternion
///     q_err = q ⊗ conj(q_des)
///
/// The error is converted to axis-angle with angle = 2 acos(w) in [0, 2π].
/// When w < 0 the rotation goes the long way around, so the angle is wrapped to
/// angle - 2π about the same axis. The result is axis * angle with
/// |angle| <= π.
pub fn orientation_error(q: &UnitQuaternion<Float>, q_des: &UnitQuaternion<Float>) -> Vector3<Float> {
    let quat_err: Quaternion<Float> = q.quaternion() * q_des.quaternion().conjugate();
    let norm = quat_err.norm();
    if norm == 0.0 {
        return Vector3::zeros();
    }
    let quat_err = quat_err / norm;

    let w = quat_err.w.clamp(-1.0, 1.0);
    let sin_half = (1.0 - w * w).max(0.0).sqrt();
    // Rotation too small to define an axis
    if sin_half < Float::EPSILON {
        return Vector3::zeros();
    }
    let axis = quat_err.imag() / sin_half;

    let mut angle = 2.0 * w.acos();
    if quat_err.w < 0.0 {
        angle -= TWO_PI;
    }
    axis * angle
}

/// Angle of the minimal rotation between two orientations, in [0, π].
pub fn quaternion_distance(q1: &UnitQuaternion<Float>, q2: &UnitQuaternion<Float>) -> Float {
    // |<q1, q2>| folds the double cover of SO(3)
    let dot = q1.coords.dot(&q2.coords).abs().min(1.0);
    2.0 * dot.acos()
}
