//! Per-body model and normal matrices.

use glam::{Mat3, Mat4, Vec3};

/// `translate(position) · rotate_y(angle) · scale(uniform)`.
pub fn model_matrix(position: Vec3, angle: f32, scale: f32) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_y(angle)
        * Mat4::from_scale(Vec3::splat(scale))
}

/// Inverse-transpose of the upper 3×3, valid for non-uniform scale too.
pub fn normal_matrix(model: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model).inverse().transpose()
}

/// Spin angle after `t` units of simulation time, wrapped to one turn in f64
/// before narrowing so long runs keep full precision.
pub fn spin_angle(t: f64, rotation_speed: f32) -> f32 {
    (t * f64::from(rotation_speed)).rem_euclid(std::f64::consts::TAU) as f32
}

/// Matrices needed to draw one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub model: Mat4,
    pub normal: Mat3,
}

impl BodyTransform {
    pub fn new(position: Vec3, t: f64, rotation_speed: f32, scale: f32) -> Self {
        let model = model_matrix(position, spin_angle(t, rotation_speed), scale);
        Self {
            model,
            normal: normal_matrix(&model),
        }
    }
}
