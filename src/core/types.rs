//! Core type aliases and re-exports

use std::fmt;

use serde::{Deserialize, Serialize};

pub use glam::{Vec2, Vec3};

/// Standard Result type for the simulation core
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Identifier of a tracked actor (the local player or a remote one).
///
/// Relay ids arrive as numbers or strings depending on the backend, so the
/// id is kept in its textual form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
