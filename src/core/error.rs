//! Error types for the simulation core

use thiserror::Error;

/// Main error type for the core.
///
/// Only configuration loading and remote payload parsing can fail; the
/// per-frame tick itself never returns an error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}
