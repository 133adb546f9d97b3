//! Validator Trait
//!
//! The seam between the synthesis loop and anything that can judge a document.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ValidationOutcome;

/// Failures that prevent a validator from reaching a verdict.
///
/// A rejection is not an error; these mean the oracle itself is unusable.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Validator program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Failed to run validator {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Validator {program} timed out after {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid gate configuration: {0}")]
    Config(String),
}

/// Result type for validator calls
pub type GateResult<T> = Result<T, GateError>;

/// Anything that can accept or reject a document.
///
/// Implementations are side-effect free with respect to the document and
/// may be called any number of times.
#[async_trait]
pub trait DocumentValidator: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Judge one complete document.
    async fn validate(&self, document: &str) -> GateResult<ValidationOutcome>;
}
