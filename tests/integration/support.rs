//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stackdraft::models::settings::SynthesisSettings;
use stackdraft::services::catalog::{CatalogError, CatalogPage, ResourceTypeCatalog};
use stackdraft::services::synthesis::{Conversation, ModelGateway, Turn};
use stackdraft_llm::{LlmError, LlmResult};
use stackdraft_quality_gates::{DocumentValidator, GateResult, ValidationOutcome};

/// Wrap a body in a fenced block
pub fn fenced(label: &str, body: &str) -> String {
    format!("Here you go.\n```{}\n{}\n```\nLet me know if anything is missing.", label, body)
}

pub fn settings(max_review_count: u32, max_continuation_turns: u32) -> SynthesisSettings {
    SynthesisSettings {
        max_review_count,
        max_continuation_turns,
        continuation_threshold: 0.8,
        max_output_tokens: 4096,
    }
}

/// Text of the first user turn of a recorded conversation
pub fn seed_text(turns: &[Turn]) -> &str {
    match turns.first() {
        Some(Turn::User { text, .. }) => text,
        _ => "",
    }
}

/// Replays scripted replies and records every conversation it is shown
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<LlmResult<String>>>,
    fallback: Option<String>,
    pub conversations: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedGateway {
    pub fn new<S: Into<String>>(replies: Vec<S>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            conversations: Mutex::new(Vec::new()),
        })
    }

    /// Same reply for every call
    pub fn constant(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(reply.into()),
            conversations: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from(vec![Err(LlmError::NetworkError {
                message: message.to_string(),
            })])),
            fallback: None,
            conversations: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    pub fn conversation(&self, index: usize) -> Vec<Turn> {
        self.conversations.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn converse(
        &self,
        conversation: &Conversation,
        _system_instruction: &str,
        _max_output_tokens: u32,
    ) -> LlmResult<String> {
        self.conversations
            .lock()
            .unwrap()
            .push(conversation.turns().to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(reply), _) => reply,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(LlmError::ProviderUnavailable {
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// Returns scripted verdicts in order, rejecting once the script ends
pub struct ScriptedValidator {
    verdicts: Mutex<VecDeque<ValidationOutcome>>,
    pub documents: Mutex<Vec<String>>,
}

impl ScriptedValidator {
    pub fn new(verdicts: Vec<ValidationOutcome>) -> Arc<Self> {
        Arc::new(Self {
            verdicts: Mutex::new(verdicts.into()),
            documents: Mutex::new(Vec::new()),
        })
    }

    pub fn always_reject() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentValidator for ScriptedValidator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn validate(&self, document: &str) -> GateResult<ValidationOutcome> {
        let mut documents = self.documents.lock().unwrap();
        documents.push(document.to_string());
        let call = documents.len();
        Ok(self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ValidationOutcome::rejected(format!("still wrong ({})", call))))
    }
}

/// Single-page in-memory catalog, or one that always fails
pub struct MemoryCatalog {
    names: Vec<String>,
    fail: bool,
}

impl MemoryCatalog {
    pub fn new(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            fail: false,
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            names: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl ResourceTypeCatalog for MemoryCatalog {
    async fn list_page(&self, _next_token: Option<&str>) -> Result<CatalogPage, CatalogError> {
        if self.fail {
            return Err(CatalogError::Command("AccessDenied".to_string()));
        }
        Ok(CatalogPage {
            type_names: self.names.clone(),
            next_token: None,
        })
    }
}
