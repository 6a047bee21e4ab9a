//! Error types for the movies ETL

use thiserror::Error;

/// Result type alias for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type for the ETL
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed embedded field: {0}")]
    EmbeddedField(String),

    #[error("Referential integrity violated: {0}")]
    Integrity(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    /// Create a malformed embedded field error
    pub fn embedded(msg: impl Into<String>) -> Self {
        Self::EmbeddedField(msg.into())
    }

    /// Create an integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
