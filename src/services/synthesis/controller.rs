//! Generation-Review Controller
//!
//! Top-level state machine of one synthesis request:
//!
//! ```text
//! Generating -> Validating -> Accepted
//!                   |
//!                   v
//!               Reviewing -> Validating -> ... -> Accepted | ExhaustedRetries
//! ```
//!
//! Generation runs exactly once. Every rejection is answered by a review
//! invocation whose seed embeds the current document and the validator's
//! feedback; the reviewed document replaces the current one. Once
//! `max_review_count` reviews have run the last reviewed document is
//! delivered unvalidated.

use std::sync::Arc;

use stackdraft_quality_gates::{DocumentValidator, ValidationOutcome};

use super::continuation::ContinuationEngine;
use super::conversation::SeedInstruction;
use super::prompts;
use super::SynthesisError;
use crate::models::document::{ArtifactStatus, DocumentKind};

/// Controller states, used for transition logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisState {
    Generating,
    Validating,
    Reviewing,
    Accepted,
    /// Rejected with no review budget at all
    Rejected,
    ExhaustedRetries,
}

impl std::fmt::Display for SynthesisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SynthesisState::Generating => "generating",
            SynthesisState::Validating => "validating",
            SynthesisState::Reviewing => "reviewing",
            SynthesisState::Accepted => "accepted",
            SynthesisState::Rejected => "rejected",
            SynthesisState::ExhaustedRetries => "exhausted_retries",
        };
        f.write_str(name)
    }
}

/// Loop variable of one request
#[derive(Debug, Clone)]
pub struct ReviewCycleState {
    /// The one current document
    pub current_document: String,
    /// Verdict on the current document, if it has been validated
    pub last_outcome: Option<ValidationOutcome>,
    pub review_count: u32,
    pub validator_calls: u32,
    pub model_turns: u32,
    pub failed_extractions: u32,
}

impl ReviewCycleState {
    fn new(document: String) -> Self {
        Self {
            current_document: document,
            last_outcome: None,
            review_count: 0,
            validator_calls: 0,
            model_turns: 0,
            failed_extractions: 0,
        }
    }
}

/// Result of a finished request
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub document: String,
    pub status: ArtifactStatus,
    pub review_count: u32,
    pub validator_calls: u32,
    pub model_turns: u32,
    pub failed_extractions: u32,
    /// Feedback of the most recent rejection
    pub last_feedback: Option<String>,
    /// Validator payload when accepted
    pub accepted_payload: Option<String>,
}

pub struct SynthesisController {
    engine: ContinuationEngine,
    validator: Arc<dyn DocumentValidator>,
    max_review_count: u32,
}

impl SynthesisController {
    pub fn new(
        engine: ContinuationEngine,
        validator: Arc<dyn DocumentValidator>,
        max_review_count: u32,
    ) -> Self {
        Self {
            engine,
            validator,
            max_review_count,
        }
    }

    /// Generate, validate and review until accepted or out of budget.
    pub async fn run(
        &self,
        kind: DocumentKind,
        generation_seed: SeedInstruction,
    ) -> Result<SynthesisOutcome, SynthesisError> {
        let system = prompts::system_instruction(kind);
        let label = kind.fence_label();

        tracing::info!(kind = %kind, state = %SynthesisState::Generating, "synthesis: state");
        let generated = self.engine.assemble(generation_seed, &system, label).await?;

        let mut cycle = ReviewCycleState::new(generated.text);
        cycle.model_turns += generated.model_turns;
        cycle.failed_extractions += generated.failed_extractions;
        let mut last_feedback: Option<String> = None;

        let final_state = loop {
            tracing::info!(
                kind = %kind,
                state = %SynthesisState::Validating,
                review_count = cycle.review_count,
                document_len = cycle.current_document.len(),
                "synthesis: state"
            );
            let outcome = self
                .validator
                .validate(&cycle.current_document)
                .await?;
            cycle.validator_calls += 1;
            cycle.last_outcome = Some(outcome.clone());

            let feedback = match outcome {
                ValidationOutcome::Accepted { .. } => break SynthesisState::Accepted,
                ValidationOutcome::Rejected { feedback } => feedback,
            };
            tracing::warn!(
                kind = %kind,
                validator = self.validator.name(),
                review_count = cycle.review_count,
                feedback = %feedback,
                "synthesis: validator rejected document"
            );
            last_feedback = Some(feedback.clone());

            if self.max_review_count == 0 {
                break SynthesisState::Rejected;
            }

            tracing::info!(
                kind = %kind,
                state = %SynthesisState::Reviewing,
                review = cycle.review_count + 1,
                max_review_count = self.max_review_count,
                "synthesis: state"
            );
            let seed = SeedInstruction::text(prompts::review_seed(
                kind,
                &cycle.current_document,
                &feedback,
            ));
            let reviewed = self.engine.assemble(seed, &system, label).await?;
            cycle.review_count += 1;
            cycle.model_turns += reviewed.model_turns;
            cycle.failed_extractions += reviewed.failed_extractions;
            cycle.current_document = reviewed.text;
            cycle.last_outcome = None;

            if cycle.review_count >= self.max_review_count {
                break SynthesisState::ExhaustedRetries;
            }
        };

        let status = match final_state {
            SynthesisState::Accepted => ArtifactStatus::Normally,
            SynthesisState::Rejected => ArtifactStatus::Error,
            _ => ArtifactStatus::NotValidated,
        };
        let accepted_payload = cycle
            .last_outcome
            .as_ref()
            .and_then(|o| o.payload())
            .map(str::to_string);

        tracing::info!(
            kind = %kind,
            state = %final_state,
            status = %status,
            review_count = cycle.review_count,
            validator_calls = cycle.validator_calls,
            model_turns = cycle.model_turns,
            "synthesis: finished"
        );

        Ok(SynthesisOutcome {
            document: cycle.current_document,
            status,
            review_count: cycle.review_count,
            validator_calls: cycle.validator_calls,
            model_turns: cycle.model_turns,
            failed_extractions: cycle.failed_extractions,
            last_feedback,
            accepted_payload,
        })
    }
}
