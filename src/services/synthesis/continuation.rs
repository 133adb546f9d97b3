//! Continuation Engine
//!
//! Obtains one complete document from a model whose single reply may be
//! cut off by the output token budget. After the seed turn the engine keeps
//! asking the model to continue, extracting one fragment per reply, until a
//! fragment looks like the tail or the turn cap is reached. Fragments are
//! joined with `"\n"` in turn order.

use std::sync::Arc;

use stackdraft_llm::LlmResult;

use super::conversation::{Conversation, SeedInstruction};
use super::fragment::extract_fragment;
use super::gateway::ModelGateway;
use super::prompts::{CONTINUE_INSTRUCTION, EMPTY_REPLY_PLACEHOLDER};

/// Decides whether a continuation fragment ends the document.
pub trait CompletionPredicate: Send + Sync {
    /// `first_len` is the first fragment's length, `fragment_len` the latest one's.
    fn is_tail(&self, first_len: usize, fragment_len: usize) -> bool;
}

/// A fragment is the tail when `fragment_len <= threshold * first_len`.
#[derive(Debug, Clone, Copy)]
pub struct RelativeLengthThreshold {
    threshold: f64,
}

impl RelativeLengthThreshold {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for RelativeLengthThreshold {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl CompletionPredicate for RelativeLengthThreshold {
    fn is_tail(&self, first_len: usize, fragment_len: usize) -> bool {
        fragment_len as f64 <= self.threshold * first_len as f64
    }
}

/// Stitched result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    /// Fragments joined by newline
    pub text: String,
    /// Model calls made, seed turn included
    pub model_turns: u32,
    /// Replies that had no fenced block
    pub failed_extractions: u32,
}

pub struct ContinuationEngine {
    gateway: Arc<dyn ModelGateway>,
    predicate: Arc<dyn CompletionPredicate>,
    max_continuation_turns: u32,
    max_output_tokens: u32,
}

impl ContinuationEngine {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        predicate: Arc<dyn CompletionPredicate>,
        max_continuation_turns: u32,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            gateway,
            predicate,
            max_continuation_turns,
            max_output_tokens,
        }
    }

    /// Run one invocation: the seed turn, then continuation turns.
    ///
    /// A reply without a fence contributes an empty segment; gateway errors
    /// end the invocation.
    pub async fn assemble(
        &self,
        seed: SeedInstruction,
        system_instruction: &str,
        fence_label: &str,
    ) -> LlmResult<AssembledDocument> {
        let mut conversation = Conversation::start(seed);
        let mut segments: Vec<String> = Vec::new();
        let mut failed_extractions = 0u32;

        let mut reply = self
            .gateway
            .converse(&conversation, system_instruction, self.max_output_tokens)
            .await?;
        let mut model_turns = 1u32;

        let first = extract_fragment(&reply, fence_label);
        if first.is_missing() {
            failed_extractions += 1;
            tracing::warn!(
                turn = model_turns,
                reply_len = reply.len(),
                fence = fence_label,
                "continuation: reply had no fenced block, keeping an empty segment"
            );
        }
        let first_len = first.char_len();
        tracing::debug!(turn = model_turns, fragment_len = first_len, "continuation: first fragment");
        segments.push(first.into_string());

        for _ in 0..self.max_continuation_turns {
            if reply.trim().is_empty() {
                tracing::warn!(turn = model_turns, "continuation: empty reply, recording placeholder");
                conversation.push_model(EMPTY_REPLY_PLACEHOLDER);
            } else {
                conversation.push_model(reply);
            }
            conversation.push_user(CONTINUE_INSTRUCTION);

            reply = self
                .gateway
                .converse(&conversation, system_instruction, self.max_output_tokens)
                .await?;
            model_turns += 1;

            let fragment = extract_fragment(&reply, fence_label);
            if fragment.is_missing() {
                failed_extractions += 1;
                tracing::warn!(
                    turn = model_turns,
                    reply_len = reply.len(),
                    fence = fence_label,
                    "continuation: reply had no fenced block, keeping an empty segment"
                );
            }
            let fragment_len = fragment.char_len();
            segments.push(fragment.into_string());

            let done = self.predicate.is_tail(first_len, fragment_len);
            tracing::debug!(
                turn = model_turns,
                fragment_len,
                first_len,
                done,
                "continuation: fragment appended"
            );
            if done {
                break;
            }
        }

        Ok(AssembledDocument {
            text: segments.join("\n"),
            model_turns,
            failed_extractions,
        })
    }
}
