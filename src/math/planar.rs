//! Ground-plane (XZ) projections.
//!
//! The game world is 3D but every gameplay distance is measured on the
//! ground plane, ignoring height. `Vec2::x` maps to world X and `Vec2::y`
//! maps to world Z.

use std::f32::consts::{PI, TAU};

use crate::core::types::{Vec2, Vec3};

/// Project a world position onto the ground plane.
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Ground-plane distance between two world positions.
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

#[inline]
pub fn planar_distance_squared(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance_squared(planar(b))
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Yaw of a ground-plane direction, measured from +Z toward +X.
///
/// Matches the convention used for facing angles: `(0, 1)` (world +Z) is 0,
/// `(1, 0)` (world +X) is PI/2.
#[inline]
pub fn heading_of(dir: Vec2) -> f32 {
    dir.x.atan2(dir.y)
}
