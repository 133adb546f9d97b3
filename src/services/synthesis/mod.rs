//! Synthesis Loop
//!
//! Generation with continuation, validation, and validator-driven review.
//!
//! - `fragment` - fenced body extraction from one reply
//! - `conversation` - turn history and seed instructions
//! - `gateway` - the `ModelGateway` seam and its provider-backed implementation
//! - `continuation` - multi-turn assembly of one complete document
//! - `controller` - the generate/validate/review state machine
//! - `prompts` - instruction text

pub mod continuation;
pub mod controller;
pub mod conversation;
pub mod fragment;
pub mod gateway;
pub mod prompts;

use stackdraft_llm::LlmError;
use stackdraft_quality_gates::GateError;

pub use continuation::{
    AssembledDocument, CompletionPredicate, ContinuationEngine, RelativeLengthThreshold,
};
pub use controller::{ReviewCycleState, SynthesisController, SynthesisOutcome, SynthesisState};
pub use conversation::{Conversation, ImageAttachment, SeedInstruction, Turn};
pub use fragment::{extract_fragment, Fragment};
pub use gateway::{LlmGateway, ModelGateway};

/// Collaborator failures that end a synthesis request
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Model gateway failed: {0}")]
    Model(#[from] LlmError),

    #[error("Validator failed: {0}")]
    Validator(#[from] GateError),
}
