//! Session - drives one local actor through the grass, noise and mob systems.
//!
//! A frame runs every subsystem in a fixed order against a single virtual
//! clock. Anything the outside world needs to act on (network reports,
//! captures) is queued as a [`SessionEvent`] and drained by the caller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::time::SimClock;
use crate::core::types::{ActorId, Vec3};
use crate::core::{Error, Result};
use crate::grass::{BendResult, GrassConfig, GrassField};
use crate::math::planar_distance;
use crate::mob::{Capture, MobConfig, MobManager};
use crate::noise::{NoiseConfig, NoiseScore, NoiseTier};
use crate::relay::{LocalMove, MovementReporter, RemoteUpdate};
use crate::trail::Trail;

/// Everything needed to build a [`Session`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seeds blade layout and mob routes.
    pub seed: u64,
    pub grass: GrassConfig,
    pub noise: NoiseConfig,
    pub mobs: MobConfig,
    pub trail_capacity: usize,
    /// Ground-plane distance below which the local actor counts as standing still.
    pub movement_epsilon: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            grass: GrassConfig::default(),
            noise: NoiseConfig::default(),
            mobs: MobConfig::default(),
            trail_capacity: 2000,
            movement_epsilon: 0.001,
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.grass.validate()?;
        self.noise.validate()?;
        self.mobs.validate()?;
        if self.trail_capacity == 0 {
            return Err(Error::Config("trail_capacity must be at least 1".into()));
        }
        if !(self.movement_epsilon.is_finite() && self.movement_epsilon >= 0.0) {
            return Err(Error::Config(format!(
                "movement_epsilon must be a non-negative number, got {}",
                self.movement_epsilon
            )));
        }
        Ok(())
    }
}

/// Per-frame input for the local actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    pub position: Vec3,
    /// Facing angle in radians, `atan2(dx, dz)` convention.
    pub facing: f32,
    pub elapsed_ms: f64,
}

/// What happened during one frame.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FrameReport {
    pub bend: BendResult,
    pub restored: usize,
    pub captures: Vec<Capture>,
    pub noise: f32,
    pub tier: Option<NoiseTier>,
}

/// Outbound notifications, drained with [`Session::drain_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The local actor moved and should be reported to the relay.
    LocalMoved(LocalMove),
    /// A mob reached an actor.
    Captured(Capture),
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionStats {
    pub frame_count: u64,
    pub now_ms: f64,
    pub trail_points: usize,
    pub total_disturbed: u64,
    pub bent_count: usize,
    pub tracked_actors: usize,
    pub mob_count: usize,
    pub noise: f32,
    pub tier: NoiseTier,
}

/// One player's view of the world.
pub struct Session {
    config: SessionConfig,
    local: ActorId,
    clock: SimClock,
    field: GrassField,
    noise: NoiseScore,
    mobs: MobManager,
    trail: Trail,
    reporter: MovementReporter,
    last_local: Option<Vec3>,
    last_tier: NoiseTier,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: SessionConfig, local: ActorId) -> Self {
        let field = GrassField::new(config.grass.clone(), config.seed);
        // Different stream from the field so routes don't mirror blade layout.
        let mobs = MobManager::new(config.mobs, config.seed.wrapping_add(1));

        log::info!("Session started for {} (seed {})", local, config.seed);

        Self {
            noise: NoiseScore::new(config.noise.clone()),
            trail: Trail::new(config.trail_capacity),
            reporter: MovementReporter::new(config.movement_epsilon),
            clock: SimClock::new(),
            last_local: None,
            last_tier: NoiseTier::Low,
            events: Vec::new(),
            local,
            field,
            mobs,
            config,
        }
    }

    /// Track a remote actor at its reported position.
    pub fn apply_remote(&mut self, update: RemoteUpdate) -> bool {
        if update.actor_id == self.local {
            log::warn!("Ignoring remote update that claims the local actor id {}", self.local);
            return false;
        }
        self.field.update_actor_position(&update.actor_id, update.position)
    }

    /// Parse and apply a relay message. On failure the actor keeps its last
    /// valid position.
    pub fn apply_remote_json(&mut self, json: &str) -> Result<()> {
        match RemoteUpdate::parse(json) {
            Ok(update) => {
                self.apply_remote(update);
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected remote update: {}", e);
                Err(e)
            }
        }
    }

    pub fn remove_remote(&mut self, id: &ActorId) -> bool {
        if *id == self.local {
            return false;
        }
        self.field.remove_actor(id)
    }

    /// Advance the world by one frame.
    pub fn frame(&mut self, input: FrameInput) -> FrameReport {
        self.clock.advance(input.elapsed_ms);
        self.field.set_time(self.clock.now_ms());

        let accepted = self.field.update_actor_position(&self.local, input.position);

        let bend = self.field.bend_around_all_tracked_actors(self.config.grass.bend_radius);
        let restored = self.field.restore_all();

        let actors = self.field.tracked_positions();
        let captures = self.mobs.tick(&actors, input.elapsed_ms);
        for capture in &captures {
            log::info!("{} caught {} ({:.2} away)", capture.mob, capture.actor, capture.distance);
            self.events.push(SessionEvent::Captured(capture.clone()));
        }

        let movement = match (accepted, self.last_local) {
            (true, Some(last)) => planar_distance(last, input.position),
            _ => 0.0,
        };
        self.noise.record_disturbance(bend.fresh);
        let noise = self.noise.update(movement, bend.fresh);
        let tier = self.noise.tier();
        let tier_changed = tier != self.last_tier;
        if tier_changed {
            log::info!("Noise {} -> {} ({:.1})", self.last_tier.label(), tier.label(), noise);
            self.last_tier = tier;
        }

        if accepted {
            self.field.update_visibility_cone(input.position, input.facing);

            let direction = Vec3::new(input.facing.sin(), 0.0, input.facing.cos());
            if let Some(report) = self.reporter.observe(input.position, direction) {
                self.trail.push(input.position);
                self.events.push(SessionEvent::LocalMoved(report));
            }
            self.last_local = Some(input.position);
        }

        FrameReport {
            bend,
            restored,
            captures,
            noise,
            tier: tier_changed.then_some(tier),
        }
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frame_count: self.clock.frame_count(),
            now_ms: self.clock.now_ms(),
            trail_points: self.trail.len(),
            total_disturbed: self.noise.total_disturbed(),
            bent_count: self.field.bent_count(),
            tracked_actors: self.field.tracked_actor_count(),
            mob_count: self.mobs.len(),
            noise: self.noise.current(),
            tier: self.noise.tier(),
        }
    }

    /// Level reset: grass upright, no mobs, empty trail, silent score.
    /// Remote actors stay tracked.
    pub fn reset(&mut self) {
        self.field.reset();
        self.mobs.clear();
        self.trail.clear();
        self.noise.reset();
        self.reporter.reset();
        self.last_local = None;
        self.last_tier = NoiseTier::Low;
        self.events.clear();
        log::info!("Session reset for {}", self.local);
    }

    pub fn local_actor(&self) -> &ActorId {
        &self.local
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn field(&self) -> &GrassField {
        &self.field
    }

    pub fn noise(&self) -> &NoiseScore {
        &self.noise
    }

    pub fn mobs(&self) -> &MobManager {
        &self.mobs
    }

    /// Mutable access for scripted levels that place mobs by hand.
    pub fn mobs_mut(&mut self) -> &mut MobManager {
        &mut self.mobs
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mob::{MobKind, MobState};

    fn small_config() -> SessionConfig {
        SessionConfig {
            seed: 11,
            grass: GrassConfig {
                blade_count: 1500,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn step(position: Vec3) -> FrameInput {
        FrameInput {
            position,
            facing: 0.0,
            elapsed_ms: 16.0,
        }
    }

    #[test]
    fn test_walk_bends_grass_and_raises_noise() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        let mut fresh = 0;
        for i in 0..100 {
            let report = session.frame(step(Vec3::new(-8.0 + i as f32 * 0.08, 0.2, 0.0)));
            fresh += report.bend.fresh;
        }

        let stats = session.stats();
        assert!(fresh > 0);
        assert_eq!(stats.total_disturbed, fresh as u64);
        assert!(stats.bent_count > 0);
        assert!(stats.noise > 0.0);
        assert_eq!(stats.trail_points, 100);
        assert_eq!(stats.frame_count, 100);
        assert!((stats.now_ms - 1600.0).abs() < 1e-9);

        let moves = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::LocalMoved(_)))
            .count();
        assert_eq!(moves, 100);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_standing_still_goes_quiet() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        for i in 0..60 {
            session.frame(step(Vec3::new(i as f32 * 0.1, 0.2, 0.0)));
        }
        session.drain_events();

        let here = Vec3::new(5.9, 0.2, 0.0);
        for _ in 0..600 {
            session.frame(step(here));
        }

        // Only the first still frame (or none) reports; then silence
        assert!(session.drain_events().is_empty());
        assert_eq!(session.stats().trail_points, 60);
        // Lifetime term alone stays below the decay-adjusted floor
        assert!(session.noise().current() < 20.0);
    }

    #[test]
    fn test_remote_actor_bends_grass_until_stale() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        let json = r#"{"type":"playerMoved","playerId":2,"position":{"x":10,"y":0.2,"z":10}}"#;
        session.apply_remote_json(json).unwrap();

        session.frame(step(Vec3::new(-10.0, 0.2, -10.0)));
        assert_eq!(session.field().tracked_actor_count(), 2);
        let near_remote = session
            .field()
            .bent_indices()
            .iter()
            .filter(|&&i| {
                let p = session.field().blades()[i].position();
                planar_distance(p, Vec3::new(10.0, 0.0, 10.0)) < 1.8
            })
            .count();
        assert!(near_remote > 0);

        // The remote never updates again and is pruned after 5s
        for _ in 0..320 {
            session.frame(step(Vec3::new(-10.0, 0.2, -10.0)));
        }
        assert_eq!(session.field().tracked_actor_count(), 1);
        assert!(session.field().tracked_actor(&ActorId::from("2")).is_none());
    }

    #[test]
    fn test_bad_remote_keeps_last_position() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        session
            .apply_remote_json(r#"{"playerId":"ghost","position":{"x":1,"z":1}}"#)
            .unwrap();
        let err = session
            .apply_remote_json(r#"{"playerId":"ghost","position":{"x":"nan","z":1}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPosition(_)));
        let tracked = session.field().tracked_actor(&ActorId::from("ghost")).unwrap();
        assert_eq!(tracked.position, Vec3::new(1.0, 0.2, 1.0));
    }

    #[test]
    fn test_remote_cannot_spoof_local() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        let spoof = RemoteUpdate {
            actor_id: ActorId::from("me"),
            position: Vec3::ZERO,
            direction: None,
        };
        assert!(!session.apply_remote(spoof));
        assert!(!session.remove_remote(&ActorId::from("me")));
    }

    #[test]
    fn test_capture_is_reported_and_queued() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        let spot = Vec3::new(3.0, 0.2, 3.0);
        let id = session
            .mobs_mut()
            .spawn_at(MobKind::Brute, vec![Vec3::new(3.0, 0.0, 3.0)], 0)
            .unwrap();

        let report = session.frame(step(spot));
        assert_eq!(report.captures.len(), 1);
        assert_eq!(report.captures[0].mob, id);
        assert_eq!(session.mobs().mob(id).unwrap().state(), MobState::Chase);

        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::Captured(c) if c.mob == id)));
    }

    #[test]
    fn test_mobs_spawn_on_timer() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        for _ in 0..320 {
            session.frame(step(Vec3::new(19.0, 0.2, 19.0)));
        }
        assert_eq!(session.mobs().len(), 1);
    }

    #[test]
    fn test_tier_reported_on_change_only() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        let mut changes = Vec::new();
        for i in 0..200 {
            let x = -15.0 + i as f32 * 0.15;
            if let Some(tier) = session.frame(step(Vec3::new(x, 0.2, 0.0))).tier {
                changes.push(tier);
            }
        }
        assert!(!changes.is_empty());
        for pair in changes.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        session.frame(step(Vec3::ZERO));
        let report = session.frame(step(Vec3::new(f32::NAN, 0.0, 0.0)));
        assert_eq!(report.bend.fresh, 0);
        let local = session.field().tracked_actor(&ActorId::from("me")).unwrap();
        assert_eq!(local.position, Vec3::ZERO);
        assert_eq!(session.trail().len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new(small_config(), ActorId::from("me"));
        session.mobs_mut().spawn(MobKind::Guard);
        for i in 0..30 {
            session.frame(step(Vec3::new(i as f32 * 0.1, 0.2, 0.0)));
        }
        session.reset();
        let stats = session.stats();
        assert_eq!(stats.bent_count, 0);
        assert_eq!(stats.mob_count, 0);
        assert_eq!(stats.trail_points, 0);
        assert_eq!(stats.total_disturbed, 0);
        assert_eq!(stats.noise, 0.0);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_config_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let json = r#"{"seed": 9, "grass": {"blade_count": 100}, "mobs": {"population_cap": 5}}"#;
        std::fs::write(&path, json).unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.grass.blade_count, 100);
        assert_eq!(config.grass.bend_radius, 1.8);
        assert_eq!(config.mobs.population_cap, 5);
        assert_eq!(config.trail_capacity, 2000);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let config = SessionConfig {
            seed: 77,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap().seed, 77);
    }

    #[test]
    fn test_config_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"mobs": {"sensing_radius": 12.0}}"#).unwrap();
        assert!(matches!(SessionConfig::load(&path), Err(Error::Config(_))));

        assert!(matches!(SessionConfig::load(dir.path().join("missing.json")), Err(Error::Io(_))));
    }
}
