//! Error types
//!
//! Only an invalid root or an unusable store ends a run. Everything that can go
//! wrong for a single folder is recovered by the builder and written to the
//! persona's audit trail instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the persona store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid key in persona store: {0}")]
    InvalidKey(String),
}

/// Errors raised by generation providers
///
/// Callers inside the builder never see these directly: the resilient wrapper
/// turns them into a fallback response.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ProviderError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("root is not a readable directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("no persona stored for {0}")]
    PersonaNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
