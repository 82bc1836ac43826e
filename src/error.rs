//! Crate-wide error type.

use std::path::PathBuf;
use std::time::Duration;

/// Errors produced by the preloader, the sampling helpers, and configuration.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    /// An operation was attempted in a state that does not allow it, such as
    /// sampling an empty population or adding resources after `load`.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A manifest or asset file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest could not be parsed.
    #[error("failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// The INI configuration could not be loaded or saved.
    #[error("config error: {0}")]
    Config(String),

    /// The blocking runner gave up before every resource reported loaded.
    #[error("preload did not finish within {0:?}")]
    Timeout(Duration),
}

impl PreloadError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        PreloadError::InvalidState(msg.into())
    }
}
