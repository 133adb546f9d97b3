//! JSON Configuration Management
//!
//! Loads the application configuration from an optional JSON file, then
//! applies `STACKDRAFT_*` environment overrides and validates the result.

use std::fs;
use std::path::{Path, PathBuf};

use stackdraft_core::ProxyConfig;
use stackdraft_llm::ProviderType;

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};

pub const ENV_PROVIDER: &str = "STACKDRAFT_PROVIDER";
pub const ENV_MODEL_ID: &str = "STACKDRAFT_MODEL_ID";
pub const ENV_API_KEY: &str = "STACKDRAFT_API_KEY";
pub const ENV_BASE_URL: &str = "STACKDRAFT_BASE_URL";
pub const ENV_INPUT_ROOT: &str = "STACKDRAFT_INPUT_ROOT";
pub const ENV_OUTPUT_DIR: &str = "STACKDRAFT_OUTPUT_DIR";
pub const ENV_SAMPLE_SHEET: &str = "STACKDRAFT_SAMPLE_SHEET";
pub const ENV_MAX_REVIEW_COUNT: &str = "STACKDRAFT_MAX_REVIEW_COUNT";
pub const ENV_PROXY: &str = "STACKDRAFT_PROXY";

/// Configuration service for loading app settings
#[derive(Debug)]
pub struct ConfigService {
    config: AppConfig,
}

impl ConfigService {
    /// Load from `path` (or defaults when `None`) with process environment overrides
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load with a custom variable lookup
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => AppConfig::default(),
        };
        Self::apply_overrides(&mut config, lookup)?;
        config.validate().map_err(AppError::validation)?;

        tracing::debug!(
            config_path = ?path,
            provider = %config.provider.provider,
            model = %config.provider.model,
            "configuration loaded"
        );

        Ok(Self { config })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        if !path.exists() {
            return Err(AppError::not_found(format!(
                "config file {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides on top of file values
    pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get(ENV_PROVIDER) {
            config.provider.provider = provider
                .parse::<ProviderType>()
                .map_err(|e| AppError::config(format!("{}: {}", ENV_PROVIDER, e)))?;
        }
        if let Some(model) = get(ENV_MODEL_ID) {
            config.provider.model = model;
        }
        if let Some(key) = get(ENV_API_KEY) {
            config.provider.api_key = Some(key);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            config.provider.base_url = Some(url);
        }
        if let Some(proxy) = get(ENV_PROXY) {
            let proxy = ProxyConfig::parse(&proxy)
                .map_err(|e| AppError::config(format!("{}: {}", ENV_PROXY, e)))?;
            config.provider.proxy = Some(proxy);
        }
        if let Some(root) = get(ENV_INPUT_ROOT) {
            config.storage.input_root = PathBuf::from(root);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            config.storage.output_dir = PathBuf::from(dir);
        }
        if let Some(sheet) = get(ENV_SAMPLE_SHEET) {
            config.storage.sample_sheet = Some(PathBuf::from(sheet));
        }
        if let Some(count) = get(ENV_MAX_REVIEW_COUNT) {
            config.synthesis.max_review_count = count.trim().parse().map_err(|_| {
                AppError::config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    ENV_MAX_REVIEW_COUNT, count
                ))
            })?;
        }
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }
}
