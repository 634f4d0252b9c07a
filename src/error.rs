//! Error taxonomy. Only session lookups and malformed requests reach clients;
//! everything else degrades to a fallback payload or a log line.

use thiserror::Error;

/// Classifier artifact could not be loaded. The service keeps running in fallback mode.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed model artifact: {0}")]
    Malformed(String),
}

/// Classification could not produce a usable prediction.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("model not available")]
    Unavailable,

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("classifier produced {0} class probabilities, expected 3")]
    ClassCount(usize),

    #[error("classifier produced non-finite probabilities")]
    NonFinite,

    #[error("feature {0} is not a finite number")]
    NonFiniteFeature(&'static str),

    #[error("malformed classifier: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
}

/// History file read/write failure. Logged and swallowed by the history log.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-level failures (startup, listener).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}
