//! Model Gateway
//!
//! The narrow seam the continuation engine talks to. One call sends the
//! whole conversation and returns the raw reply text.

use std::sync::Arc;

use async_trait::async_trait;
use stackdraft_llm::{LlmError, LlmProvider, LlmRequestOptions, LlmResult};

use super::conversation::Conversation;

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send every turn so far and return the model's reply text.
    async fn converse(
        &self,
        conversation: &Conversation,
        system_instruction: &str,
        max_output_tokens: u32,
    ) -> LlmResult<String>;
}

/// Gateway over any configured provider
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
}

impl LlmGateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ModelGateway for LlmGateway {
    async fn converse(
        &self,
        conversation: &Conversation,
        system_instruction: &str,
        max_output_tokens: u32,
    ) -> LlmResult<String> {
        if conversation.has_image() && !self.provider.supports_multimodal() {
            return Err(LlmError::InvalidRequest {
                message: format!(
                    "{} provider does not accept image input",
                    self.provider.name()
                ),
            });
        }

        let response = self
            .provider
            .send_message(
                conversation.to_messages(),
                Some(system_instruction.to_string()),
                LlmRequestOptions::with_max_tokens(max_output_tokens),
            )
            .await?;

        tracing::debug!(
            provider = self.provider.name(),
            turns = conversation.len(),
            reply_len = response.text().len(),
            truncated = response.is_truncated(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total_tokens(),
            "gateway: model replied"
        );

        Ok(response.content.unwrap_or_default())
    }
}
