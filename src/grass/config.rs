//! Grass field configuration.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::grass::blade::RecoveryTiming;

/// Settings for the trampled-grass field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Side length of the square field, centred on the origin.
    pub size: f32,
    /// Number of blades generated (fixed for the field's lifetime).
    pub blade_count: usize,
    /// World height blades are planted at.
    pub blade_height: f32,
    /// Planar radius around an actor within which blades bend.
    pub bend_radius: f32,
    /// Restore ticks a bent blade stays fully flattened.
    pub hold_ticks: u32,
    /// Restore ticks spent ramping back to the rest pose after the hold.
    pub recovery_ticks: u32,
    /// Tracked actors not updated for this long are dropped before bending.
    pub stale_actor_ms: f64,
    /// Spatial grid cell size. Defaults to the bend radius when unset.
    pub grid_cell_size: Option<f32>,
    /// View-cone fade applied to blade opacity.
    pub visibility: VisibilityConeConfig,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            size: 40.0,
            blade_count: 8000,
            blade_height: 1.25,
            bend_radius: 1.8,
            hold_ticks: 240,
            recovery_ticks: 60,
            stale_actor_ms: 5000.0,
            grid_cell_size: None,
            visibility: VisibilityConeConfig::default(),
        }
    }
}

impl GrassConfig {
    pub fn timing(&self) -> RecoveryTiming {
        RecoveryTiming {
            hold_ticks: self.hold_ticks,
            recovery_ticks: self.recovery_ticks,
        }
    }

    /// Effective spatial grid cell size.
    pub fn cell_size(&self) -> f32 {
        self.grid_cell_size.unwrap_or(self.bend_radius).max(0.05)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.size > 0.0) {
            return Err(Error::Config(format!("grass size must be positive, got {}", self.size)));
        }
        if !(self.bend_radius >= 0.0) {
            return Err(Error::Config(format!(
                "bend radius must be non-negative, got {}",
                self.bend_radius
            )));
        }
        if self.recovery_ticks == 0 {
            return Err(Error::Config("recovery_ticks must be at least 1".into()));
        }
        if matches!(self.grid_cell_size, Some(c) if !(c > 0.0)) {
            return Err(Error::Config("grid_cell_size must be positive".into()));
        }
        self.visibility.validate()
    }
}

/// View-cone parameters for blade opacity.
///
/// The fade band lies inside the cone: blades are fully opaque up to
/// `cone_angle / 2 - fade_angle` off the facing direction and fade to zero
/// at `cone_angle / 2`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConeConfig {
    /// Total cone angle in radians.
    pub cone_angle: f32,
    /// Width of the fade band in radians.
    pub fade_angle: f32,
    /// Blades beyond this planar distance are invisible.
    pub max_distance: f32,
    /// Blades closer than this are not distance-faded.
    pub min_distance: f32,
}

impl Default for VisibilityConeConfig {
    fn default() -> Self {
        Self {
            cone_angle: PI * 0.75,
            fade_angle: PI * 0.25,
            max_distance: 25.0,
            min_distance: 3.0,
        }
    }
}

impl VisibilityConeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_distance < self.max_distance) {
            return Err(Error::Config(format!(
                "cone min_distance ({}) must be below max_distance ({})",
                self.min_distance, self.max_distance
            )));
        }
        if !(self.fade_angle >= 0.0 && self.fade_angle <= self.cone_angle * 0.5) {
            return Err(Error::Config(format!(
                "fade_angle ({}) must lie within half the cone ({})",
                self.fade_angle,
                self.cone_angle * 0.5
            )));
        }
        Ok(())
    }
}
