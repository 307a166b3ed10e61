//! View-cone opacity for grass blades.
//!
//! Opacity is the product of a distance factor and an angle factor, both in
//! `[0, 1]`. It is a pure function of its inputs so the whole field can be
//! evaluated in parallel.

use crate::core::types::Vec2;
use crate::grass::config::VisibilityConeConfig;
use crate::math::{heading_of, wrap_angle};

/// Distance factor: 1 inside `min_distance`, 0 beyond `max_distance`,
/// linear in between.
pub fn distance_factor(config: &VisibilityConeConfig, distance: f32) -> f32 {
    if distance > config.max_distance {
        0.0
    } else if distance <= config.min_distance {
        1.0
    } else {
        1.0 - (distance - config.min_distance) / (config.max_distance - config.min_distance)
    }
}

/// Angle factor for an absolute offset (radians, `0..=PI`) from the facing
/// direction.
pub fn angle_factor(config: &VisibilityConeConfig, angle_offset: f32) -> f32 {
    let half_cone = config.cone_angle * 0.5;
    let fade_start = half_cone - config.fade_angle;

    if angle_offset > half_cone {
        0.0
    } else if angle_offset > fade_start {
        1.0 - (angle_offset - fade_start) / config.fade_angle
    } else {
        1.0
    }
}

/// Opacity of a blade at ground-plane point `target` seen from `viewer`
/// facing `facing` (yaw from +Z toward +X).
pub fn cone_opacity(config: &VisibilityConeConfig, viewer: Vec2, facing: f32, target: Vec2) -> f32 {
    let offset = target - viewer;
    let distance = offset.length();

    let dist = distance_factor(config, distance);
    if dist == 0.0 {
        return 0.0;
    }

    // A blade under the viewer has no meaningful bearing.
    if distance <= f32::EPSILON {
        return dist;
    }

    let angle_offset = wrap_angle(heading_of(offset) - facing).abs();
    angle_factor(config, angle_offset) * dist
}
