//! Error types for the render layer and its collaborators

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON or wrong field types
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed but out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Annotation store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id under this key
    #[error("Annotation not found: {id} (key {key})")]
    NotFound { key: String, id: String },

    /// Export or import failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
