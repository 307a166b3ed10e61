//! Patrolling mobs that chase and capture nearby actors.

pub mod agent;
pub mod config;
pub mod manager;

pub use agent::{Mob, MobDebugInfo, MobId, MobKind, MobState};
pub use config::MobConfig;
pub use manager::{Capture, MobManager};
