//! MobManager - spawning, ticking and capture detection for all mobs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::types::{ActorId, Vec3};
use crate::math::{planar_distance, planar_distance_squared, Rect};
use crate::mob::agent::{Mob, MobId, MobKind};
use crate::mob::config::MobConfig;

/// A mob got within capture range of a tracked actor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Capture {
    pub mob: MobId,
    pub actor: ActorId,
    pub distance: f32,
}

/// Owns every live mob.
pub struct MobManager {
    config: MobConfig,
    mobs: Vec<Mob>,
    spawn_accumulator_ms: f64,
    next_id: u32,
    patrol_bounds: Rect,
    rng: ChaCha8Rng,
}

impl MobManager {
    pub fn new(config: MobConfig, seed: u64) -> Self {
        Self {
            patrol_bounds: Rect::centered(config.patrol_area),
            config,
            mobs: Vec::new(),
            spawn_accumulator_ms: 0.0,
            next_id: 1,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Spawn a mob on a random patrol route. Returns `None` when the
    /// population cap is reached.
    pub fn spawn(&mut self, kind: MobKind) -> Option<MobId> {
        if self.is_full() {
            return None;
        }

        let waypoints = self.config.patrol_waypoints.max(1);
        let route: Vec<Vec3> = (0..waypoints)
            .map(|_| {
                let p = self.patrol_bounds.sample(&mut self.rng);
                Vec3::new(p.x, 0.0, p.y)
            })
            .collect();
        let start = self.rng.gen_range(0..route.len());

        self.spawn_at(kind, route, start)
    }

    /// Spawn a mob on an explicit route, starting at waypoint `start_index`.
    pub fn spawn_at(
        &mut self,
        kind: MobKind,
        route: Vec<Vec3>,
        start_index: usize,
    ) -> Option<MobId> {
        if self.is_full() {
            return None;
        }

        let id = MobId(self.next_id);
        self.next_id += 1;

        let mob = Mob::new(id, kind, route, start_index, self.config);
        log::info!(
            "Spawned {:?} {} at {:?} ({} of {})",
            kind,
            id,
            mob.position(),
            self.mobs.len() + 1,
            self.config.population_cap
        );
        self.mobs.push(mob);
        Some(id)
    }

    /// Advance the spawn timer, update every mob against its nearest actor,
    /// then report every (mob, actor) pair within capture range.
    pub fn tick(&mut self, actors: &[(ActorId, Vec3)], elapsed_ms: f64) -> Vec<Capture> {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.spawn_accumulator_ms += elapsed_ms;
        }
        if self.spawn_accumulator_ms > self.config.spawn_interval_ms && !self.is_full() {
            self.spawn(MobKind::Guard);
            self.spawn_accumulator_ms = 0.0;
        }

        for mob in &mut self.mobs {
            let nearest = nearest_actor(mob.position(), actors);
            mob.update(nearest);
        }

        self.check_captures(actors)
    }

    fn check_captures(&self, actors: &[(ActorId, Vec3)]) -> Vec<Capture> {
        let mut captures = Vec::new();
        for mob in &self.mobs {
            for (actor, position) in actors {
                let distance = planar_distance(mob.position(), *position);
                if distance < self.config.capture_radius {
                    log::debug!(
                        "{} captured actor {} at distance {:.2}",
                        mob.id(),
                        actor,
                        distance
                    );
                    captures.push(Capture {
                        mob: mob.id(),
                        actor: actor.clone(),
                        distance,
                    });
                }
            }
        }
        captures
    }

    /// Remove a mob. Returns whether it was present.
    pub fn remove(&mut self, id: MobId) -> bool {
        let before = self.mobs.len();
        self.mobs.retain(|m| m.id() != id);
        before != self.mobs.len()
    }

    /// Remove every mob and restart the spawn timer.
    pub fn clear(&mut self) {
        self.mobs.clear();
        self.spawn_accumulator_ms = 0.0;
    }

    pub fn is_full(&self) -> bool {
        self.mobs.len() >= self.config.population_cap
    }

    pub fn mobs(&self) -> &[Mob] {
        &self.mobs
    }

    pub fn mob(&self, id: MobId) -> Option<&Mob> {
        self.mobs.iter().find(|m| m.id() == id)
    }

    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }

    pub fn spawn_accumulator_ms(&self) -> f64 {
        self.spawn_accumulator_ms
    }

    pub fn config(&self) -> &MobConfig {
        &self.config
    }
}

/// Position of the actor closest to `from` on the ground plane.
fn nearest_actor(from: Vec3, actors: &[(ActorId, Vec3)]) -> Option<Vec3> {
    actors
        .iter()
        .map(|(_, p)| *p)
        .min_by(|a, b| {
            planar_distance_squared(from, *a).total_cmp(&planar_distance_squared(from, *b))
        })
}
