//! Axis-aligned ground-plane rectangle

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Ground-plane rectangle defined by min and max corners (world X/Z).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square of side `size` centred on the origin
    pub fn centered(size: f32) -> Self {
        let half = Vec2::splat(size * 0.5);
        Self { min: -half, max: half }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if a ground-plane point is inside (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y
    }

    /// Uniformly sample a ground-plane point inside the rectangle.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            self.min.x + rng.r#gen::<f32>() * (self.max.x - self.min.x),
            self.min.y + rng.r#gen::<f32>() * (self.max.y - self.min.y),
        )
    }
}
