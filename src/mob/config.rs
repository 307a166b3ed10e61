//! Mob tuning and population settings.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Behaviour and population parameters shared by all mobs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MobConfig {
    /// Ground-plane distance covered per tick.
    pub speed: f32,
    /// An actor closer than this is spotted (Patrol -> Chase).
    pub sensing_radius: f32,
    /// An actor farther than this ends a chase. Must exceed `sensing_radius`.
    pub disengage_radius: f32,
    /// Distance at which a waypoint or last-known position counts as reached.
    pub arrival_threshold: f32,
    /// Minimum distance to target before the heading is updated.
    pub facing_epsilon: f32,
    /// Actor closer than this to any mob is captured.
    pub capture_radius: f32,
    /// Maximum concurrent mobs.
    pub population_cap: usize,
    /// Time between automatic spawns.
    pub spawn_interval_ms: f64,
    /// Waypoints per randomized patrol route.
    pub patrol_waypoints: usize,
    /// Side of the square (centred on origin) patrol waypoints are drawn from.
    pub patrol_area: f32,
}

impl Default for MobConfig {
    fn default() -> Self {
        Self {
            speed: 0.02,
            sensing_radius: 6.0,
            disengage_radius: 10.0,
            arrival_threshold: 1.5,
            facing_epsilon: 0.1,
            capture_radius: 2.0,
            population_cap: 3,
            spawn_interval_ms: 5000.0,
            patrol_waypoints: 3,
            patrol_area: 25.0,
        }
    }
}

impl MobConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.speed >= 0.0) {
            return Err(Error::Config(format!(
                "mob speed must be non-negative, got {}",
                self.speed
            )));
        }
        if !(self.disengage_radius > self.sensing_radius) {
            return Err(Error::Config(format!(
                "disengage radius ({}) must exceed sensing radius ({})",
                self.disengage_radius, self.sensing_radius
            )));
        }
        if self.patrol_waypoints == 0 {
            return Err(Error::Config("patrol routes need at least one waypoint".into()));
        }
        if !(self.patrol_area > 0.0) {
            return Err(Error::Config("patrol area must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(MobConfig::default().validate().is_ok());
    }

    #[test]
    fn test_disengage_must_exceed_sensing() {
        let cfg = MobConfig { disengage_radius: 6.0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }
}
