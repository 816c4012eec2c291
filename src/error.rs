//! Error types for the mean rate distribution engine.

use thiserror::Error;

/// Result-store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Corrupt dataset {name}: {reason}")]
    CorruptDataset { name: String, reason: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by a calculation run.
///
/// Every variant is fatal for the run that produced it; nothing is persisted
/// once one of these has been raised.
#[derive(Debug, Error)]
pub enum MrdError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Too many sites: {sites} (the limit is {limit})")]
    TooManySites { sites: usize, limit: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Worker failure on unit {unit_id}: {message}")]
    WorkerFailure { unit_id: usize, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl MrdError {
    pub fn config(msg: impl Into<String>) -> Self {
        MrdError::Configuration(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        MrdError::ShapeMismatch(msg.into())
    }
}

impl From<config::ConfigError> for MrdError {
    fn from(err: config::ConfigError) -> Self {
        MrdError::Configuration(err.to_string())
    }
}
