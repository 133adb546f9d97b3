//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use stackdraft_llm::LlmError;
use stackdraft_quality_gates::GateError;
use thiserror::Error;

use crate::services::catalog::CatalogError;
use crate::services::synthesis::SynthesisError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model provider setup errors
    #[error("Model provider error: {0}")]
    Llm(#[from] LlmError),

    /// Validator setup errors
    #[error("Validator error: {0}")]
    Gate(#[from] GateError),

    /// Resource type catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Fatal failures inside the synthesis loop
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Object store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
