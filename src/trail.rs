//! Footprint trail left behind a moving actor.

use std::collections::VecDeque;

use crate::core::types::{Vec2, Vec3};
use crate::math::planar;

/// Trail points older than this index are drawn at full "worn" intensity.
const COLOR_RAMP_POINTS: f32 = 500.0;

/// Bounded FIFO of ground-plane footprints. The oldest point is dropped once
/// the capacity is reached.
#[derive(Clone, Debug)]
pub struct Trail {
    capacity: usize,
    points: VecDeque<Vec2>,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            points: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Append a footprint. Returns the number of points afterwards.
    pub fn push(&mut self, position: Vec3) -> usize {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(planar(position));
        self.points.len()
    }

    /// Footprints, oldest first.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    /// Color of the point at `index` (0 = oldest). Ramps from fresh green
    /// toward worn brown over the first few hundred points.
    pub fn color_at(&self, index: usize) -> [f32; 3] {
        let intensity = (index as f32 / COLOR_RAMP_POINTS).min(1.0);
        [0.4 + intensity * 0.3, 0.6 - intensity * 0.2, 0.2]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(2000)
    }
}
