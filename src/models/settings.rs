//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use stackdraft_llm::ProviderConfig;
use stackdraft_quality_gates::command::CLOUDFORMATION_VALIDATE_COMMAND;

/// Application configuration stored in config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model provider
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Generation and review loop limits
    #[serde(default)]
    pub synthesis: SynthesisSettings,
    /// Resource type catalog source
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// Template validators
    #[serde(default)]
    pub validation: TemplateValidationSettings,
    /// Input and output locations
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Limits of the synthesis loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Review invocations allowed after a rejection
    #[serde(default = "default_max_review_count")]
    pub max_review_count: u32,
    /// Continuation turns after the first reply
    #[serde(default = "default_max_continuation_turns")]
    pub max_continuation_turns: u32,
    /// Fraction of the first fragment length at or below which a fragment ends the document
    #[serde(default = "default_continuation_threshold")]
    pub continuation_threshold: f64,
    /// Output token budget per model call
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_max_review_count() -> u32 {
    3
}

fn default_max_continuation_turns() -> u32 {
    5
}

fn default_continuation_threshold() -> f64 {
    0.8
}

fn default_max_output_tokens() -> u32 {
    4096
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            max_review_count: default_max_review_count(),
            max_continuation_turns: default_max_continuation_turns(),
            continuation_threshold: default_continuation_threshold(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Where the resource type allow-list comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Read the catalog from a JSON file instead of the `aws` CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// CLI program used for `cloudformation list-types`
    #[serde(default = "default_aws_program")]
    pub aws_program: String,
    /// Only type names with this prefix enter the allow-list
    #[serde(default = "default_type_prefix")]
    pub type_prefix: String,
    /// Upper bound on pages followed before giving up
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Timeout per page request
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_aws_program() -> String {
    "aws".to_string()
}

fn default_type_prefix() -> String {
    "AWS::".to_string()
}

fn default_max_pages() -> usize {
    100
}

fn default_catalog_timeout_secs() -> u64 {
    60
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            file: None,
            aws_program: default_aws_program(),
            type_prefix: default_type_prefix(),
            max_pages: default_max_pages(),
            timeout_secs: default_catalog_timeout_secs(),
        }
    }
}

/// Validators applied to generated templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateValidationSettings {
    /// Run the local structure and allow-list check first
    #[serde(default = "default_true")]
    pub structure_check: bool,
    /// External validator command line; `{path}` is replaced by the template file
    #[serde(default = "default_validate_command")]
    pub command: Option<String>,
    /// Timeout for the external validator
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_validate_command() -> Option<String> {
    Some(CLOUDFORMATION_VALIDATE_COMMAND.to_string())
}

fn default_command_timeout_secs() -> u64 {
    120
}

impl Default for TemplateValidationSettings {
    fn default() -> Self {
        Self {
            structure_check: true,
            command: default_validate_command(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

/// Local object store layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one subdirectory per bucket
    #[serde(default = "default_input_root")]
    pub input_root: PathBuf,
    /// Directory receiving generated artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Sample parameter sheet used as the format reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_sheet: Option<PathBuf>,
}

fn default_input_root() -> PathBuf {
    PathBuf::from("input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            input_root: default_input_root(),
            output_dir: default_output_dir(),
            sample_sheet: None,
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.provider.validate()?;

        let synthesis = &self.synthesis;
        if synthesis.max_review_count > 20 {
            return Err("max_review_count cannot exceed 20".to_string());
        }

        if synthesis.max_continuation_turns > 50 {
            return Err("max_continuation_turns cannot exceed 50".to_string());
        }

        if !(synthesis.continuation_threshold > 0.0 && synthesis.continuation_threshold <= 1.0) {
            return Err(format!(
                "Invalid continuation_threshold: {}. Must be in (0.0, 1.0]",
                synthesis.continuation_threshold
            ));
        }

        if synthesis.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }

        if self.catalog.type_prefix.is_empty() {
            return Err("catalog.type_prefix must not be empty".to_string());
        }

        if self.catalog.max_pages == 0 {
            return Err("catalog.max_pages must be at least 1".to_string());
        }

        if let Some(command) = &self.validation.command {
            if command.trim().is_empty() {
                return Err("validation.command must not be blank; omit it instead".to_string());
            }
        }

        if self.validation.command_timeout_secs == 0 {
            return Err("validation.command_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
