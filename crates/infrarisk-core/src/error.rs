//! Error types for InfraRisk

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraRiskError {
    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Catalog errors
    #[error("Catalog request failed: {reason}")]
    Catalog { reason: String },

    #[error("Invalid catalog record {record}: {reason}")]
    InvalidRecord { record: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for InfraRiskError {
    fn from(err: serde_json::Error) -> Self {
        InfraRiskError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InfraRiskError>;
