//! Command Gate
//!
//! Hands the document to an external validator program. The document is
//! written to a scratch file whose path replaces every `{path}` placeholder
//! in the argument list; the program's exit status is the verdict.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::models::ValidationOutcome;
use crate::validator::{DocumentValidator, GateError, GateResult};

/// Placeholder replaced by the scratch file path
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Default external validator for CloudFormation templates
pub const CLOUDFORMATION_VALIDATE_COMMAND: &str =
    "aws cloudformation validate-template --template-body file://{path}";

/// Runs an external program against the document
#[derive(Debug, Clone)]
pub struct CommandGate {
    name: String,
    program: String,
    args: Vec<String>,
    timeout_secs: u64,
    file_suffix: String,
}

impl CommandGate {
    /// Create a gate for `program` with arguments that may contain `{path}`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args,
            timeout_secs: 120,
            file_suffix: ".txt".to_string(),
        }
    }

    /// Parse a whitespace-separated command line
    pub fn from_command_line(command_line: &str) -> GateResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| GateError::Config("validator command is empty".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Set the gate name used in logs and reports
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the scratch file suffix (including the dot)
    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    fn render_args(&self, path: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(PATH_PLACEHOLDER, path))
            .collect()
    }
}

/// Join the non-empty output streams, stderr first.
fn collect_feedback(stderr: &str, stdout: &str, exit_code: Option<i32>) -> String {
    let parts: Vec<&str> = [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        match exit_code {
            Some(code) => format!("validator exited with status {}", code),
            None => "validator terminated by signal".to_string(),
        }
    } else {
        parts.join("\n")
    }
}

#[async_trait]
impl DocumentValidator for CommandGate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, document: &str) -> GateResult<ValidationOutcome> {
        let scratch = tempfile::Builder::new()
            .prefix("stackdraft-")
            .suffix(&self.file_suffix)
            .tempfile()?;
        tokio::fs::write(scratch.path(), document).await?;

        let path = scratch.path().to_string_lossy().into_owned();
        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(&path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let output = match timeout(Duration::from_secs(self.timeout_secs), cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(GateError::ProgramNotFound {
                    program: self.program.clone(),
                })
            }
            Ok(Err(e)) => {
                return Err(GateError::Spawn {
                    program: self.program.clone(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(GateError::Timeout {
                    program: self.program.clone(),
                    timeout_secs: self.timeout_secs,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let duration_ms = start.elapsed().as_millis() as u64;

        if output.status.success() {
            tracing::debug!(gate = %self.name, duration_ms, "command gate accepted");
            Ok(ValidationOutcome::accepted(stdout.trim()))
        } else {
            tracing::debug!(
                gate = %self.name,
                duration_ms,
                exit_code = ?output.status.code(),
                "command gate rejected"
            );
            Ok(ValidationOutcome::rejected(collect_feedback(
                &stderr,
                &stdout,
                output.status.code(),
            )))
        }
    }
}
