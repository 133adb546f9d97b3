//! Stackdraft LLM
//!
//! Provides a unified interface for multimodal model providers:
//! - Anthropic Claude
//! - OpenAI Chat Completions
//! - Ollama (local inference through its OpenAI-compatible endpoint)
//!
//! Also includes the HTTP client factory shared by the providers.

use std::sync::Arc;

pub mod anthropic;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;

/// Create an LLM provider from a ProviderConfig.
///
/// Factory function that maps ProviderType to the concrete provider implementation.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    config
        .validate()
        .map_err(|message| LlmError::InvalidRequest { message })?;

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderType::OpenAI | ProviderType::Ollama => Arc::new(OpenAIProvider::new(config)?),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_by_type() {
        let anthropic = create_provider(ProviderConfig::default()).unwrap();
        assert_eq!(anthropic.name(), "anthropic");

        let ollama = create_provider(ProviderConfig {
            provider: ProviderType::Ollama,
            model: "llava".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ollama.name(), "ollama");
    }

    #[test]
    fn test_create_provider_rejects_invalid_config() {
        let result = create_provider(ProviderConfig {
            temperature: 2.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(LlmError::InvalidRequest { .. })));
    }
}
