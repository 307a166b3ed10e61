//! Noise score: how conspicuous the local player currently is.
//!
//! Three capped contributions (movement speed, freshly trampled grass, and
//! all-time trampled grass) form a target. The score eases toward it each
//! tick and then pays a fixed decay, so it sinks when the player stands
//! still. It only reaches zero while the all-time term is below
//! `decay / smoothing`; past that it settles at `lifetime - decay / smoothing`.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Weights, caps and tier thresholds for the noise score.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub speed_weight: f32,
    pub speed_cap: f32,
    pub fresh_weight: f32,
    pub fresh_cap: f32,
    /// All-time disturbed count is divided by this.
    pub lifetime_divisor: f32,
    pub lifetime_cap: f32,
    /// Fraction of the gap to the target closed per tick.
    pub smoothing: f32,
    /// Subtracted after smoothing, every tick.
    pub decay: f32,
    /// Scores below this are `Low`.
    pub medium_threshold: f32,
    /// Scores at or above this are `High`.
    pub high_threshold: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            speed_weight: 300.0,
            speed_cap: 50.0,
            fresh_weight: 3.0,
            fresh_cap: 30.0,
            lifetime_divisor: 15.0,
            lifetime_cap: 20.0,
            smoothing: 0.1,
            decay: 0.5,
            medium_threshold: 25.0,
            high_threshold: 60.0,
        }
    }
}

impl NoiseConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(Error::Config(format!(
                "noise smoothing must be in (0, 1], got {}",
                self.smoothing
            )));
        }
        if !(self.decay >= 0.0) {
            return Err(Error::Config(format!(
                "noise decay must be non-negative, got {}",
                self.decay
            )));
        }
        if !(self.lifetime_divisor > 0.0) {
            return Err(Error::Config("noise lifetime_divisor must be positive".into()));
        }
        if !(self.medium_threshold < self.high_threshold) {
            return Err(Error::Config(format!(
                "noise tier thresholds out of order: {} >= {}",
                self.medium_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

/// Coarse noise band shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoiseTier {
    Low,
    Medium,
    High,
}

impl NoiseTier {
    pub fn label(self) -> &'static str {
        match self {
            NoiseTier::Low => "LOW",
            NoiseTier::Medium => "MEDIUM",
            NoiseTier::High => "HIGH",
        }
    }
}

/// Smoothed noise score.
#[derive(Clone, Debug)]
pub struct NoiseScore {
    config: NoiseConfig,
    current: f32,
    total_disturbed: u64,
}

impl NoiseScore {
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            config,
            current: 0.0,
            total_disturbed: 0,
        }
    }

    /// Ease toward the target built from this tick's inputs, then decay.
    /// Returns the new score.
    pub fn update(&mut self, movement: f32, freshly_disturbed: usize) -> f32 {
        let c = &self.config;
        let movement = if movement.is_finite() { movement.max(0.0) } else { 0.0 };

        let speed = (movement * c.speed_weight).min(c.speed_cap);
        let fresh = (freshly_disturbed as f32 * c.fresh_weight).min(c.fresh_cap);
        let lifetime = (self.total_disturbed as f32 / c.lifetime_divisor).min(c.lifetime_cap);
        let target = speed + fresh + lifetime;

        let smoothed = self.current + (target - self.current) * c.smoothing;
        self.current = (smoothed - c.decay).max(0.0);
        self.current
    }

    /// Add to the all-time disturbed counter.
    pub fn record_disturbance(&mut self, count: usize) {
        self.total_disturbed += count as u64;
    }

    pub fn tier(&self) -> NoiseTier {
        if self.current < self.config.medium_threshold {
            NoiseTier::Low
        } else if self.current < self.config.high_threshold {
            NoiseTier::Medium
        } else {
            NoiseTier::High
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn total_disturbed(&self) -> u64 {
        self.total_disturbed
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
        self.total_disturbed = 0;
    }
}

impl Default for NoiseScore {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decays_strictly_to_zero_without_input() {
        let mut score = NoiseScore::default();
        for _ in 0..30 {
            score.update(0.08, 10);
        }
        assert!(score.current() > 0.0);

        let mut prev = score.current();
        let mut ticks = 0;
        while prev > 0.0 {
            let next = score.update(0.0, 0);
            assert!(next < prev, "score did not drop: {} -> {}", prev, next);
            prev = next;
            ticks += 1;
            assert!(ticks < 1000);
        }
        for _ in 0..10 {
            assert_eq!(score.update(0.0, 0), 0.0);
        }
    }

    #[test]
    fn test_first_update_smooths_then_decays() {
        let mut score = NoiseScore::default();
        // speed 0.08 * 300 = 24, fresh 5 * 3 = 15 -> target 39
        let v = score.update(0.08, 5);
        assert!((v - (3.9 - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_contributions_are_capped() {
        let mut score = NoiseScore::default();
        score.record_disturbance(1_000_000);
        for _ in 0..500 {
            score.update(10.0, 10_000);
        }
        // Converges to (50 + 30 + 20) - decay / smoothing
        let limit = 100.0 - 0.5 / 0.1;
        assert!((score.current() - limit).abs() < 0.01);
        assert_eq!(score.tier(), NoiseTier::High);
    }

    #[test]
    fn test_decay_dips_below_sustained_target() {
        let mut score = NoiseScore::default();
        for _ in 0..500 {
            score.update(0.0, 5);
        }
        // Sustained target of 15 settles at 15 - 0.5/0.1 = 10
        assert!((score.current() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_lifetime_term_uses_total_disturbed() {
        let mut quiet = NoiseScore::default();
        let mut trampled = NoiseScore::default();
        trampled.record_disturbance(150);
        assert_eq!(trampled.total_disturbed(), 150);
        quiet.update(0.0, 0);
        let v = trampled.update(0.0, 0);
        assert!((v - (1.0 - 0.5)).abs() < 1e-5);
        assert_eq!(quiet.current(), 0.0);
    }

    #[test]
    fn test_lifetime_term_sets_idle_floor() {
        let mut score = NoiseScore::default();
        // 600 / 15 = 40, capped at 20: idle target 20 settles at 20 - 0.5/0.1
        score.record_disturbance(600);

        let first = score.update(0.0, 0);
        assert!((first - 1.5).abs() < 1e-5);
        let mut prev = first;
        for _ in 0..500 {
            let next = score.update(0.0, 0);
            assert!(next >= prev);
            prev = next;
        }
        assert!((score.current() - 15.0).abs() < 1e-3);

        // From above the floor it sinks back to it, never below
        score.current = 50.0;
        for _ in 0..500 {
            assert!(score.update(0.0, 0) >= 15.0 - 1e-3);
        }
        assert!((score.current() - 15.0).abs() < 1e-3);
        assert_eq!(score.tier(), NoiseTier::Low);
    }

    #[test]
    fn test_tiers() {
        let mut score = NoiseScore::default();
        assert_eq!(score.tier(), NoiseTier::Low);
        score.current = 25.0;
        assert_eq!(score.tier(), NoiseTier::Medium);
        score.current = 59.9;
        assert_eq!(score.tier(), NoiseTier::Medium);
        score.current = 60.0;
        assert_eq!(score.tier(), NoiseTier::High);
        assert!(NoiseTier::Low < NoiseTier::High);
    }

    #[test]
    fn test_negative_movement_ignored() {
        let mut score = NoiseScore::default();
        assert_eq!(score.update(-5.0, 0), 0.0);
        assert_eq!(score.update(f32::NAN, 0), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut score = NoiseScore::default();
        score.record_disturbance(40);
        score.update(1.0, 3);
        score.reset();
        assert_eq!(score.current(), 0.0);
        assert_eq!(score.total_disturbed(), 0);
    }

    #[test]
    fn test_config_validation() {
        assert!(NoiseConfig::default().validate().is_ok());
        let bad = NoiseConfig { medium_threshold: 70.0, ..Default::default() };
        assert!(bad.validate().is_err());
    }
}
