//! GrassField - the full population of blades plus tracked actors.
//!
//! The field owns every blade, a spatial grid over blade positions, and the
//! set of currently bent blades. Restoration only walks the bent set, so its
//! per-tick cost scales with how much grass is disturbed, not with the size
//! of the field.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::core::types::{ActorId, Vec3};
use crate::grass::blade::GrassBlade;
use crate::grass::config::GrassConfig;
use crate::grass::grid::BladeGrid;
use crate::grass::visibility::cone_opacity;
use crate::math::{planar, Rect};

/// Blades hit by one bend pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BendResult {
    /// Blades within the radius, bent before or during this pass.
    pub total: usize,
    /// Blades that went from upright to bent during this pass.
    pub fresh: usize,
}

impl Add for BendResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total: self.total + rhs.total,
            fresh: self.fresh + rhs.fresh,
        }
    }
}

impl AddAssign for BendResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Last known position of an actor that deforms grass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackedActor {
    pub position: Vec3,
    /// Field time (ms) of the last position update.
    pub last_update_ms: f64,
}

/// Serializable summary for debug overlays and logs.
#[derive(Clone, Debug, Serialize)]
pub struct FieldDebugInfo {
    pub blade_count: usize,
    pub bent_count: usize,
    pub tracked_actors: Vec<(ActorId, TrackedActor)>,
    pub restore_visits: u64,
}

/// Fixed population of deformable blades over a square area.
pub struct GrassField {
    config: GrassConfig,
    bounds: Rect,
    blades: Vec<GrassBlade>,
    grid: BladeGrid,
    /// Indices of bent blades. Holds each bent blade exactly once.
    bent: Vec<usize>,
    actors: BTreeMap<ActorId, TrackedActor>,
    now_ms: f64,
    /// Cumulative per-blade restore operations, for cost accounting.
    restore_visits: u64,
}

impl GrassField {
    /// Generate `config.blade_count` blades at random positions.
    pub fn new(config: GrassConfig, seed: u64) -> Self {
        let bounds = Rect::centered(config.size);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let blades: Vec<GrassBlade> = (0..config.blade_count)
            .map(|_| {
                let p = bounds.sample(&mut rng);
                GrassBlade::random(Vec3::new(p.x, config.blade_height, p.y), &mut rng)
            })
            .collect();

        log::info!(
            "Generated grass field: {} blades over {}x{} (seed {})",
            blades.len(),
            config.size,
            config.size,
            seed
        );

        Self::with_blades(config, blades)
    }

    /// Plant blades at explicit positions, with seeded random rest poses.
    pub fn from_positions(
        config: GrassConfig,
        positions: impl IntoIterator<Item = Vec3>,
        seed: u64,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let blades = positions
            .into_iter()
            .map(|p| GrassBlade::random(p, &mut rng))
            .collect();
        Self::with_blades(config, blades)
    }

    /// Build a field around pre-made blades.
    pub fn with_blades(config: GrassConfig, blades: Vec<GrassBlade>) -> Self {
        let grid = BladeGrid::build(blades.iter().map(|b| b.position()), config.cell_size());
        Self {
            bounds: Rect::centered(config.size),
            config,
            blades,
            grid,
            bent: Vec::new(),
            actors: BTreeMap::new(),
            now_ms: 0.0,
            restore_visits: 0,
        }
    }

    /// Set the field's notion of "now" (ms), used to timestamp actor updates.
    pub fn set_time(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Record an actor's current position.
    ///
    /// Non-finite coordinates are rejected and logged; the actor keeps its
    /// previous position and timestamp. Returns whether the update was
    /// accepted.
    pub fn update_actor_position(&mut self, id: &ActorId, position: Vec3) -> bool {
        if !position.is_finite() {
            log::warn!("Rejected non-finite position for actor {}: {:?}", id, position);
            return false;
        }

        self.actors.insert(
            id.clone(),
            TrackedActor {
                position,
                last_update_ms: self.now_ms,
            },
        );
        true
    }

    /// Stop tracking an actor. Returns whether it was tracked.
    pub fn remove_actor(&mut self, id: &ActorId) -> bool {
        self.actors.remove(id).is_some()
    }

    /// Drop actors not updated within `max_idle_ms`. Returns how many were
    /// removed.
    pub fn prune_stale_actors(&mut self, max_idle_ms: f64) -> usize {
        let now = self.now_ms;
        let before = self.actors.len();
        self.actors.retain(|id, actor| {
            let keep = now - actor.last_update_ms <= max_idle_ms;
            if !keep {
                log::info!("Dropped stale actor {} from grass tracking", id);
            }
            keep
        });
        before - self.actors.len()
    }

    /// Prune stale actors, then bend around every remaining one.
    ///
    /// A blade inside the radius of two actors is counted in `total` for
    /// both but is `fresh` at most once.
    pub fn bend_around_all_tracked_actors(&mut self, radius: f32) -> BendResult {
        self.prune_stale_actors(self.config.stale_actor_ms);

        let points: Vec<Vec3> = self.actors.values().map(|a| a.position).collect();
        let mut result = BendResult::default();
        for point in points {
            result += self.bend_around_point(point, radius);
        }
        result
    }

    /// Bend every upright blade within planar `radius` of `point`, away from
    /// the point. Already-bent blades in range count toward `total` only.
    pub fn bend_around_point(&mut self, point: Vec3, radius: f32) -> BendResult {
        let center = planar(point);
        let radius_sq = radius * radius;
        let mut result = BendResult::default();

        let blades = &mut self.blades;
        let bent = &mut self.bent;
        self.grid.visit_candidates(center, radius, |i| {
            let blade = &mut blades[i];
            let offset = planar(blade.position()) - center;
            if offset.length_squared() >= radius_sq {
                return;
            }

            result.total += 1;
            if blade.bend(offset.normalize_or_zero()) {
                bent.push(i);
                result.fresh += 1;
            }
        });

        result
    }

    /// Advance every bent blade by one restore tick. Returns how many became
    /// upright this tick.
    pub fn restore_all(&mut self) -> usize {
        let timing = self.config.timing();
        let blades = &mut self.blades;
        let before = self.bent.len();

        self.restore_visits += before as u64;
        self.bent.retain(|&i| !blades[i].restore(timing).is_restored());

        before - self.bent.len()
    }

    /// Recompute blade opacity for a viewer at `viewer` facing `facing_angle`
    /// (radians, yaw from +Z toward +X).
    pub fn update_visibility_cone(&mut self, viewer: Vec3, facing_angle: f32) {
        let cone = self.config.visibility;
        let eye = planar(viewer);
        self.blades.par_iter_mut().for_each(|blade| {
            let opacity = cone_opacity(&cone, eye, facing_angle, planar(blade.position()));
            blade.set_opacity(opacity);
        });
    }

    /// Stand every blade back up and clear the bent set. Tracked actors are
    /// kept.
    pub fn reset(&mut self) {
        for blade in &mut self.blades {
            blade.reset();
        }
        self.bent.clear();
    }

    pub fn config(&self) -> &GrassConfig {
        &self.config
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn blades(&self) -> &[GrassBlade] {
        &self.blades
    }

    pub fn blade(&self, index: usize) -> Option<&GrassBlade> {
        self.blades.get(index)
    }

    pub fn blade_count(&self) -> usize {
        self.blades.len()
    }

    pub fn bent_count(&self) -> usize {
        self.bent.len()
    }

    /// Indices of currently bent blades, in bend order.
    pub fn bent_indices(&self) -> &[usize] {
        &self.bent
    }

    pub fn tracked_actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn tracked_actor(&self, id: &ActorId) -> Option<&TrackedActor> {
        self.actors.get(id)
    }

    /// Snapshot of tracked actor positions, ordered by id.
    pub fn tracked_positions(&self) -> Vec<(ActorId, Vec3)> {
        self.actors
            .iter()
            .map(|(id, actor)| (id.clone(), actor.position))
            .collect()
    }

    /// Total per-blade restore operations performed so far.
    pub fn restore_visits(&self) -> u64 {
        self.restore_visits
    }

    pub fn debug_info(&self) -> FieldDebugInfo {
        FieldDebugInfo {
            blade_count: self.blades.len(),
            bent_count: self.bent.len(),
            tracked_actors: self.actors.iter().map(|(id, a)| (id.clone(), *a)).collect(),
            restore_visits: self.restore_visits,
        }
    }
}
