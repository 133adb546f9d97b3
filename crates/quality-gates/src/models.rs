//! Validation Models
//!
//! Outcome and per-gate report types shared by every validator.

use serde::{Deserialize, Serialize};

/// Verdict of one validator call.
///
/// Payloads are opaque: callers pass them on verbatim and never inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The document passed; `payload` is whatever the validator reported.
    Accepted { payload: String },
    /// The document failed; `feedback` describes why.
    Rejected { feedback: String },
}

impl ValidationOutcome {
    pub fn accepted(payload: impl Into<String>) -> Self {
        ValidationOutcome::Accepted {
            payload: payload.into(),
        }
    }

    pub fn rejected(feedback: impl Into<String>) -> Self {
        ValidationOutcome::Rejected {
            feedback: feedback.into(),
        }
    }

    /// Check if the document was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }

    /// Feedback text when rejected
    pub fn feedback(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Rejected { feedback } => Some(feedback),
            ValidationOutcome::Accepted { .. } => None,
        }
    }

    /// Payload text when accepted
    pub fn payload(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Accepted { payload } => Some(payload),
            ValidationOutcome::Rejected { .. } => None,
        }
    }
}

/// Quality gate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    /// Gate accepted the document
    Passed,
    /// Gate rejected the document
    Failed,
    /// Gate did not run because an earlier hard gate rejected
    Skipped,
}

impl GateStatus {
    /// Check if this status indicates failure
    pub fn is_failure(&self) -> bool {
        matches!(self, GateStatus::Failed)
    }
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateStatus::Passed => write!(f, "passed"),
            GateStatus::Failed => write!(f, "failed"),
            GateStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result of running one gate of a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    /// Gate name
    pub gate_name: String,
    /// Status of the gate
    pub status: GateStatus,
    /// Payload when passed, feedback when failed, reason when skipped
    pub message: String,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Unix timestamp (ms) when the gate started
    pub started_at: i64,
}

impl GateReport {
    /// Build a report from a gate's outcome
    pub fn from_outcome(gate_name: &str, outcome: &ValidationOutcome, duration_ms: u64) -> Self {
        let (status, message) = match outcome {
            ValidationOutcome::Accepted { payload } => (GateStatus::Passed, payload.clone()),
            ValidationOutcome::Rejected { feedback } => (GateStatus::Failed, feedback.clone()),
        };
        Self {
            gate_name: gate_name.to_string(),
            status,
            message,
            duration_ms,
            started_at: chrono::Utc::now().timestamp_millis() - duration_ms as i64,
        }
    }

    /// Create a report for a gate that never ran
    pub fn skipped(gate_name: &str, reason: impl Into<String>) -> Self {
        Self {
            gate_name: gate_name.to_string(),
            status: GateStatus::Skipped,
            message: reason.into(),
            duration_ms: 0,
            started_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
