//! Error types for the document store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O errors from the local backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or malformed configuration/credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Document present but does not match its collection's shape
    #[error("Invalid document {id} in {collection}: {message}")]
    InvalidDocument { collection: String, id: String, message: String },
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this is a setup problem (fatal for batch scripts)
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
