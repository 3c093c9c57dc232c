//! 4D → 3D projection and 2D screen placement.

use crate::constants::{PERSPECTIVE_DISTANCE, XW_FREQUENCY, YW_FREQUENCY, ZW_FREQUENCY};
use glam::{Vec2, Vec3, Vec4};

// keeps the perspective divide finite when w approaches -PERSPECTIVE_DISTANCE
const MIN_PERSPECTIVE_DENOM: f32 = 0.1;

/// Angles for the three rotation planes that involve the w axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationAngles {
    pub xw: f32,
    pub yw: f32,
    pub zw: f32,
}

impl RotationAngles {
    /// XW, YW and ZW angles from one rotation phase.
    pub fn from_angle(angle: f32) -> Self {
        Self {
            xw: angle * XW_FREQUENCY,
            yw: angle * YW_FREQUENCY,
            zw: angle * ZW_FREQUENCY,
        }
    }
}

#[inline]
pub fn rotate_xw(p: Vec4, angle: f32) -> Vec4 {
    let (s, c) = angle.sin_cos();
    Vec4::new(c * p.x - s * p.w, p.y, p.z, s * p.x + c * p.w)
}

#[inline]
pub fn rotate_yw(p: Vec4, angle: f32) -> Vec4 {
    let (s, c) = angle.sin_cos();
    Vec4::new(p.x, c * p.y - s * p.w, p.z, s * p.y + c * p.w)
}

#[inline]
pub fn rotate_zw(p: Vec4, angle: f32) -> Vec4 {
    let (s, c) = angle.sin_cos();
    Vec4::new(p.x, p.y, c * p.z - s * p.w, s * p.z + c * p.w)
}

pub fn rotate_4d(p: Vec4, angles: RotationAngles) -> Vec4 {
    rotate_zw(rotate_yw(rotate_xw(p, angles.xw), angles.yw), angles.zw)
}

/// Perspective divide by `2 / (2 + w)`.
#[inline]
pub fn perspective_divide(p: Vec4) -> Vec3 {
    let denom = (PERSPECTIVE_DISTANCE + p.w).max(MIN_PERSPECTIVE_DENOM);
    p.truncate() * (PERSPECTIVE_DISTANCE / denom)
}

pub fn project_4d(p: Vec4, angles: RotationAngles) -> Vec3 {
    perspective_divide(rotate_4d(p, angles))
}

/// Conventional 2D rotation followed by a translation.
#[inline]
pub fn place_on_screen(p: Vec2, angle: f32, offset: Vec2) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c * p.x - s * p.y, s * p.x + c * p.y) + offset
}

/// Lift a placed screen coordinate into homogeneous 4D.
///
/// `dimension` 3.0 keeps the point in the w = 0 hyperplane; every unit above
/// that adds one unit of w amplitude. `morph` bends z and w with the position.
pub fn lift_to_4d(p: Vec2, time_s: f32, dimension: f32, morph: f32) -> Vec4 {
    let depth = (dimension - 3.0).max(0.0);
    let z = (time_s * 0.3 + p.x * morph).sin() * 0.5;
    let w = depth * (time_s * 0.2 + p.x * p.y * morph).cos();
    Vec4::new(p.x, p.y, z, w)
}
