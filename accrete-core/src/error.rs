//! Error types for the accrete core
//!
//! Index misuse on the body store is a caller bug and is reported, never
//! retried. Numeric degeneracies (coincident bodies, zero mass) are not
//! errors at all; the physics code guards them locally.

use thiserror::Error;

/// Failure when addressing the body store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("body index {index} out of bounds (live bodies: {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Invalid tunables or an unreadable configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Anything that can abort a simulation step or its setup
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to start force workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
