//! Trampled-grass simulation.
//!
//! A fixed population of blades is scattered over a square field. Actors
//! flatten blades around them; flattened blades hold for a while, then spring
//! back. A view-cone pass fades blades outside the viewer's field of view.

pub mod blade;
pub mod config;
pub mod field;
pub mod grid;
pub mod visibility;

pub use blade::{BendState, BladePose, GrassBlade, RecoveryTiming, RestoreOutcome};
pub use config::{GrassConfig, VisibilityConeConfig};
pub use field::{BendResult, FieldDebugInfo, GrassField, TrackedActor};
pub use grid::BladeGrid;
