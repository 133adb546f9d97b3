//! Document Models
//!
//! Kinds of generated artifacts, their terminal status, and the output
//! naming convention `{input_name}_{timestamp}_{status}.{ext}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Timestamp format used in artifact names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "template"];

/// Kind of document the synthesis loop produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// CloudFormation template generated from an architecture diagram
    Template,
    /// CSV parameter sheet generated from a template and a sample sheet
    ParameterSheet,
}

impl DocumentKind {
    /// Label of the fenced code block the model wraps the document in
    pub fn fence_label(&self) -> &'static str {
        match self {
            DocumentKind::Template => "yaml",
            DocumentKind::ParameterSheet => "csv",
        }
    }

    /// File extension of the stored artifact
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Template => "yaml",
            DocumentKind::ParameterSheet => "csv",
        }
    }

    /// Human-readable name used in prompts and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Template => "CloudFormation template",
            DocumentKind::ParameterSheet => "parameter sheet",
        }
    }

    /// Pick the job for an uploaded object from its extension.
    ///
    /// Diagrams produce templates; templates produce parameter sheets.
    pub fn for_input(key: &str) -> Option<Self> {
        let ext = Path::new(key)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)?;
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(DocumentKind::Template)
        } else if TEMPLATE_EXTENSIONS.contains(&ext.as_str()) {
            Some(DocumentKind::ParameterSheet)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Template => write!(f, "template"),
            DocumentKind::ParameterSheet => write!(f, "paramsheet"),
        }
    }
}

/// Terminal status tag carried in the artifact name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// The validator accepted the delivered document
    Normally,
    /// The validator rejected the delivered document and no review was allowed
    Error,
    /// The review budget ran out; the delivered document was never validated
    NotValidated,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Normally => "normally",
            ArtifactStatus::Error => "error",
            ArtifactStatus::NotValidated => "notvalidated",
        }
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build `{input_name}_{timestamp}_{status}.{ext}`
pub fn artifact_file_name(
    input_name: &str,
    timestamp: &str,
    status: ArtifactStatus,
    kind: DocumentKind,
) -> String {
    format!(
        "{}_{}_{}.{}",
        input_name,
        timestamp,
        status.as_str(),
        kind.extension()
    )
}

/// Current local time in `TIMESTAMP_FORMAT`
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Derive the artifact input name from an object key or file path.
///
/// Keeps the final path segment without its extension; characters outside
/// `[A-Za-z0-9._-]` become `_`.
pub fn input_name_from_key(key: &str) -> String {
    let stem = Path::new(key)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "input".to_string()
    } else {
        cleaned
    }
}
