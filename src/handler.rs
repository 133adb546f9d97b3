//! Invocation Handler
//!
//! Entry point for object-upload notifications. Downloads the uploaded
//! object, runs the job its extension calls for, and reports the result as
//! a status code plus body. Details of a failure go to the log only.

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::models::document::{input_name_from_key, DocumentKind};
use crate::services::jobs::{JobRunner, StoredArtifact};
use crate::utils::error::{AppError, AppResult};

pub const SUCCESS_BODY: &str = "Processing completed successfully";
pub const FAILURE_BODY: &str = "Internal Server Error";

/// Object-upload notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

impl InvocationEvent {
    /// Event for a single uploaded object
    pub fn for_object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![EventRecord {
                s3: S3Entity {
                    bucket: BucketRef { name: bucket.into() },
                    object: ObjectRef { key: key.into() },
                },
            }],
        }
    }

    /// Bucket and key of the first record
    pub fn object_ref(&self) -> Option<(&str, &str)> {
        self.records
            .first()
            .map(|r| (r.s3.bucket.name.as_str(), r.s3.object.key.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: SUCCESS_BODY.to_string(),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            body: FAILURE_BODY.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Handle one notification
pub async fn handle(runner: &JobRunner, event: &InvocationEvent) -> HandlerResponse {
    let invocation_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("invocation", id = %invocation_id);

    match process(runner, event).instrument(span.clone()).await {
        Ok(artifact) => {
            span.in_scope(|| {
                tracing::info!(
                    file_name = %artifact.file_name,
                    status = %artifact.status,
                    "handler: processing completed"
                )
            });
            HandlerResponse::ok()
        }
        Err(e) => {
            span.in_scope(|| tracing::error!(error = %e, "handler: unhandled failure"));
            HandlerResponse::internal_error()
        }
    }
}

async fn process(runner: &JobRunner, event: &InvocationEvent) -> AppResult<StoredArtifact> {
    let (bucket, key) = event
        .object_ref()
        .ok_or_else(|| AppError::validation("event has no records"))?;
    let kind = DocumentKind::for_input(key)
        .ok_or_else(|| AppError::validation(format!("no job for object {}", key)))?;
    let input_name = input_name_from_key(key);
    tracing::info!(bucket, key, kind = %kind, "handler: received object");

    let scratch = tempfile::tempdir()?;
    let file_name = std::path::Path::new(key)
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| AppError::validation(format!("invalid object key {}", key)))?;
    let local = scratch.path().join(file_name);
    runner.store().download(bucket, key, &local).await?;

    match kind {
        DocumentKind::Template => runner.run_template(&local, &input_name).await,
        DocumentKind::ParameterSheet => {
            let sample = runner
                .sample_sheet()
                .ok_or_else(|| AppError::config("no sample parameter sheet configured"))?;
            runner
                .run_parameter_sheet(&local, sample, &input_name)
                .await
        }
    }
}
