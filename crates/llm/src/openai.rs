//! OpenAI-compatible Provider
//!
//! Implementation of the LlmProvider trait for the Chat Completions API.
//! Ollama exposes the same wire format under `/v1/chat/completions`, so one
//! provider serves both; only the default endpoint and key policy differ.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::http_client::build_http_client;
use crate::provider::{missing_api_key_error, parse_http_error, transport_error, LlmProvider};
use crate::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageContent, MessageRole,
    ProviderConfig, ProviderType, StopReason, UsageStats,
};

/// Default OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default local Ollama endpoint (OpenAI-compatible)
const OLLAMA_API_URL: &str = "http://localhost:11434/v1/chat/completions";

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(
            config.proxy.as_ref(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self { config, client })
    }

    fn is_ollama(&self) -> bool {
        self.config.provider == ProviderType::Ollama
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        let default = if self.is_ollama() {
            OLLAMA_API_URL
        } else {
            OPENAI_API_URL
        };
        self.config.base_url.as_deref().unwrap_or(default)
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": request_options
                .max_tokens_override
                .unwrap_or(self.config.max_tokens),
            "temperature": request_options
                .temperature_override
                .unwrap_or(self.config.temperature),
            "stream": false,
        });

        let mut openai_messages: Vec<serde_json::Value> = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            openai_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }
        openai_messages.extend(messages.iter().map(|m| self.message_to_openai(m)));
        body["messages"] = serde_json::json!(openai_messages);

        body
    }

    /// Convert a Message to OpenAI API format
    fn message_to_openai(&self, message: &Message) -> serde_json::Value {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        if message.has_image() {
            // Vision input goes as a content-part array with data URLs
            let content_parts: Vec<serde_json::Value> = message
                .content
                .iter()
                .map(|c| match c {
                    MessageContent::Text { text } => serde_json::json!({
                        "type": "text",
                        "text": text
                    }),
                    MessageContent::Image { media_type, data } => serde_json::json!({
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:{};base64,{}", media_type, data)
                        }
                    }),
                })
                .collect();

            return serde_json::json!({
                "role": role,
                "content": content_parts
            });
        }

        let text_content: String = message
            .content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.as_str()),
                MessageContent::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::json!({
            "role": role,
            "content": text_content
        })
    }

    /// Parse a response from the Chat Completions API
    fn parse_response(&self, response: &OpenAIResponse) -> LlmResponse {
        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .filter(|text| !text.is_empty());

        let stop_reason = choice
            .and_then(|c| c.finish_reason.as_deref())
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .as_ref()
            .map(|u| UsageStats {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        LlmResponse {
            content,
            stop_reason,
            usage,
            model: response
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        if self.is_ollama() {
            "ollama"
        } else {
            "openai"
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn supports_multimodal(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let api_key = match (&self.config.api_key, self.config.provider.requires_api_key()) {
            (Some(key), _) => Some(key.as_str()),
            (None, false) => None,
            (None, true) => return Err(missing_api_key_error(self.name())),
        };

        let body = self.build_request_body(&messages, system.as_deref(), &request_options);

        let mut request = self
            .client
            .post(self.base_url())
            .header("content-type", "application/json");
        if let Some(key) = api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        let openai_response: OpenAIResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let parsed = self.parse_response(&openai_response);
        tracing::debug!(
            provider = self.name(),
            model = %parsed.model,
            stop_reason = ?parsed.stop_reason,
            output_tokens = parsed.usage.output_tokens,
            "openai: response received"
        );
        Ok(parsed)
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

// Chat Completions response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
