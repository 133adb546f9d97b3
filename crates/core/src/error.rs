//! Core Error Types
//!
//! Foundational error type shared by the stackdraft workspace. The binary
//! crate wraps it in its own `AppError`.

use thiserror::Error;

/// Core error type for the stackdraft workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
