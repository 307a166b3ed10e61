//! Ground-plane math helpers

pub mod planar;
pub mod rect;

pub use planar::{planar, planar_distance, planar_distance_squared, wrap_angle, heading_of};
pub use rect::Rect;
