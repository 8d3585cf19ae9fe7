//! Error types for the Ludo engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers. In-turn anomalies (stale strategy choices,
/// players without a legal move, exhausted move limits) are not errors: the
/// engine logs and skips them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("no board configuration for board size {board_size} (supported: 7, 9, 11, 13)")]
    ConfigNotFound { board_size: u8 },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid dice roll: {message}")]
    InvalidRoll { message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl EngineError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
