//! Fixed camera and model transforms.
//!
//! Projection and view are rebuilt every frame from the current viewport.
//! The model rotation is accumulated incrementally by `rotate_model`.

use std::f64::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_2;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 10.0;
pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -4.0);
pub const ROTATION_AXIS: Vec3 = Vec3::new(0.8, 0.6, 0.1);
/// Radians per second.
pub const ROTATION_SPEED: f64 = FRAC_PI_2;

/// Perspective projection for a `width` x `height` viewport. A zero height is
/// treated as one pixel so the aspect ratio stays finite.
pub fn projection(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(FOV_Y, aspect, Z_NEAR, Z_FAR)
}

pub fn view() -> Mat4 {
    Mat4::from_translation(CAMERA_OFFSET)
}

/// Applies `delta` seconds of rotation in the model's local frame:
/// `model * R(axis, speed * delta)`.
pub fn rotate_model(model: Mat4, delta: f64) -> Mat4 {
    let angle = (ROTATION_SPEED * delta) as f32;
    model * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), angle)
}
