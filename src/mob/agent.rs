//! A single patrolling mob.
//!
//! State machine:
//!
//! ```text
//!            actor < sensing
//!   Patrol ------------------> Chase
//!     ^                          |
//!     | waypoint reached         | actor > disengage, or
//!     |                          | last-known point reached
//!   Return <---------------------+
//! ```
//!
//! Every state shares one movement primitive: step toward `target` at a
//! fixed speed on the ground plane.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Vec3};
use crate::math::{heading_of, planar, planar_distance};
use crate::mob::config::MobConfig;

/// Unique mob identifier within a manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MobId(pub u32);

impl fmt::Display for MobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mob#{}", self.0)
    }
}

/// Cosmetic mob variety. Behaviour is identical across kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobKind {
    #[default]
    Guard,
    Archer,
    Brute,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobState {
    #[default]
    Patrol,
    Chase,
    Return,
}

/// Serializable snapshot for debug overlays.
#[derive(Clone, Debug, Serialize)]
pub struct MobDebugInfo {
    pub id: MobId,
    pub kind: MobKind,
    pub state: MobState,
    pub position: Vec3,
    pub target: Vec3,
    pub heading: f32,
}

/// A patrolling, chasing mob.
#[derive(Clone, Debug)]
pub struct Mob {
    id: MobId,
    kind: MobKind,
    config: MobConfig,
    position: Vec3,
    target: Vec3,
    state: MobState,
    route: Vec<Vec3>,
    route_index: usize,
    last_known_actor: Option<Vec3>,
    heading: f32,
}

impl Mob {
    /// Place a mob on waypoint `start_index` of `route`, heading for the next
    /// one. An empty route is replaced by a single waypoint at the origin.
    pub fn new(
        id: MobId,
        kind: MobKind,
        route: Vec<Vec3>,
        start_index: usize,
        config: MobConfig,
    ) -> Self {
        let route = if route.is_empty() {
            log::warn!("{} created without a patrol route; holding at origin", id);
            vec![Vec3::ZERO]
        } else {
            route
        };
        let route_index = start_index % route.len();
        let position = route[route_index];

        let mut mob = Self {
            id,
            kind,
            config,
            position,
            target: position,
            state: MobState::Patrol,
            route,
            route_index,
            last_known_actor: None,
            heading: 0.0,
        };
        mob.advance_waypoint();
        mob
    }

    /// Run one tick against the nearest actor (if any). Returns the state
    /// after the tick.
    pub fn update(&mut self, nearest_actor: Option<Vec3>) -> MobState {
        let before = self.state;

        match self.state {
            MobState::Patrol => self.update_patrol(nearest_actor),
            MobState::Chase => self.update_chase(nearest_actor),
            MobState::Return => self.update_return(),
        }

        if self.state != before {
            log::debug!("{} {:?} -> {:?} at {:?}", self.id, before, self.state, self.position);
        }

        self.step();
        self.update_heading();
        self.state
    }

    fn update_patrol(&mut self, actor: Option<Vec3>) {
        if let Some(actor) = actor {
            if planar_distance(self.position, actor) < self.config.sensing_radius {
                self.state = MobState::Chase;
                self.last_known_actor = Some(actor);
                self.target = actor;
                return;
            }
        }

        if self.reached_target() {
            self.advance_waypoint();
        }
    }

    fn update_chase(&mut self, actor: Option<Vec3>) {
        let distance = actor.map_or(f32::INFINITY, |a| planar_distance(self.position, a));

        if distance > self.config.disengage_radius {
            self.enter_return();
            return;
        }

        if let Some(actor) = actor.filter(|_| distance < self.config.sensing_radius) {
            self.last_known_actor = Some(actor);
            self.target = actor;
            return;
        }

        // Lost sight: head for where the actor was last seen.
        match self.last_known_actor {
            Some(last) if planar_distance(self.position, last) >= self.config.arrival_threshold => {
                self.target = last;
            }
            _ => self.enter_return(),
        }
    }

    fn update_return(&mut self) {
        if self.reached_target() {
            self.state = MobState::Patrol;
            self.last_known_actor = None;
        }
    }

    fn enter_return(&mut self) {
        self.state = MobState::Return;
        self.advance_waypoint();
    }

    fn reached_target(&self) -> bool {
        planar_distance(self.position, self.target) < self.config.arrival_threshold
    }

    fn advance_waypoint(&mut self) {
        self.route_index = (self.route_index + 1) % self.route.len();
        self.target = self.route[self.route_index];
    }

    /// Move toward the target by at most `speed`, never overshooting.
    fn step(&mut self) {
        let to_target = planar(self.target) - planar(self.position);
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            return;
        }

        let step = to_target / distance * self.config.speed.min(distance);
        self.position.x += step.x;
        self.position.z += step.y;
    }

    fn update_heading(&mut self) {
        let to_target: Vec2 = planar(self.target) - planar(self.position);
        if to_target.length() > self.config.facing_epsilon {
            self.heading = heading_of(to_target.normalize());
        }
    }

    pub fn id(&self) -> MobId {
        self.id
    }

    pub fn kind(&self) -> MobKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn state(&self) -> MobState {
        self.state
    }

    pub fn route(&self) -> &[Vec3] {
        &self.route
    }

    /// Index of the waypoint currently (or next) targeted.
    pub fn route_index(&self) -> usize {
        self.route_index
    }

    pub fn last_known_actor(&self) -> Option<Vec3> {
        self.last_known_actor
    }

    /// Yaw from +Z toward +X.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn config(&self) -> &MobConfig {
        &self.config
    }

    pub fn debug_info(&self) -> MobDebugInfo {
        MobDebugInfo {
            id: self.id,
            kind: self.kind,
            state: self.state,
            position: self.position,
            target: self.target,
            heading: self.heading,
        }
    }
}
