//! Grassveil - grass deformation, noise and mob pursuit simulation core

pub mod core;
pub mod math;
pub mod grass;
pub mod noise;
pub mod mob;
pub mod trail;
pub mod relay;
pub mod session;
