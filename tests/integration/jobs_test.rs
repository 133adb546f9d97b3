//! Jobs Integration Tests
//!
//! Full template and parameter sheet runs against a directory-backed object
//! store, an in-memory catalog and scripted model replies.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use tempfile::TempDir;

use stackdraft::models::document::ArtifactStatus;
use stackdraft::services::jobs::JobRunner;
use stackdraft::services::synthesis::Turn;
use stackdraft::storage::objects::LocalObjectStore;
use stackdraft::AppError;

use super::support::{fenced, seed_text, settings, MemoryCatalog, ScriptedGateway, ScriptedValidator};

// ============================================================================
// Helper Functions
// ============================================================================

const BUCKET_TEMPLATE: &str = "AWSTemplateFormatVersion: \"2010-09-09\"\nResources:\n  Bucket:\n    Type: AWS::S3::Bucket";
const LAMBDA_TEMPLATE: &str = "Resources:\n  Fn:\n    Type: AWS::Lambda::Function";

fn artifact_pattern() -> Regex {
    Regex::new(r"^\w+_\d{14}_(normally|error|notvalidated)\.(yaml|csv)$").unwrap()
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    fn store(&self) -> Arc<LocalObjectStore> {
        Arc::new(LocalObjectStore::new(
            self.dir.path().join("input"),
            self.output_dir(),
        ))
    }

    fn write(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn outputs(&self) -> Vec<String> {
        match fs::read_dir(self.output_dir()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn diagram(ws: &Workspace) -> PathBuf {
    ws.write("web_app.png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
}

// ============================================================================
// Template Jobs
// ============================================================================

#[tokio::test]
async fn test_template_job_stores_accepted_template() {
    let ws = Workspace::new();
    let gateway = ScriptedGateway::new(vec![fenced("yaml", BUCKET_TEMPLATE)]);
    let catalog = MemoryCatalog::new(&["AWS::S3::Bucket", "AWS::IAM::Role", "Custom::Seeder"]);
    let runner = JobRunner::new(gateway.clone(), catalog, ws.store()).with_synthesis(settings(3, 0));

    let artifact = runner.run_template(&diagram(&ws), "web_app").await.unwrap();

    assert_eq!(artifact.status, ArtifactStatus::Normally);
    assert_eq!(artifact.review_count, 0);
    assert!(artifact_pattern().is_match(&artifact.file_name));
    assert!(artifact.file_name.starts_with("web_app_"));
    assert!(artifact.file_name.ends_with("_normally.yaml"));
    assert_eq!(fs::read_to_string(&artifact.location).unwrap(), BUCKET_TEMPLATE);
    assert_eq!(ws.outputs(), vec![artifact.file_name.clone()]);

    // The seed carries the diagram and the filtered allow-list
    let generation = gateway.conversation(0);
    match &generation[0] {
        Turn::User { image: Some(image), .. } => assert_eq!(image.media_type, "image/png"),
        other => panic!("expected an image seed, got {:?}", other),
    }
    let seed = seed_text(&generation);
    assert!(seed.contains("AWS::S3::Bucket\nAWS::IAM::Role"));
    assert!(!seed.contains("Custom::Seeder"));
}

#[tokio::test]
async fn test_type_outside_allow_list_is_reviewed() {
    let ws = Workspace::new();
    let gateway = ScriptedGateway::new(vec![
        fenced("yaml", LAMBDA_TEMPLATE),
        fenced("yaml", BUCKET_TEMPLATE),
    ]);
    let catalog = MemoryCatalog::new(&["AWS::S3::Bucket"]);
    let runner = JobRunner::new(gateway.clone(), catalog, ws.store()).with_synthesis(settings(3, 0));

    let artifact = runner.run_template(&diagram(&ws), "web").await.unwrap();

    assert_eq!(artifact.status, ArtifactStatus::Normally);
    assert_eq!(artifact.review_count, 1);
    let review_seed = seed_text(&gateway.conversation(1)).to_string();
    assert!(review_seed.contains("Resource Fn: unsupported resource type AWS::Lambda::Function"));
    assert!(review_seed.contains(LAMBDA_TEMPLATE));
}

#[tokio::test]
async fn test_allow_list_uses_configured_type_prefix() {
    let ws = Workspace::new();
    let template = "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n  Hook:\n    Type: Custom::Seeder";
    let gateway = ScriptedGateway::new(vec![fenced("yaml", template)]);
    let catalog = MemoryCatalog::new(&["AWS::IAM::Role", "Custom::Seeder"]);
    let runner = JobRunner::new(gateway.clone(), catalog, ws.store())
        .with_synthesis(settings(0, 0))
        .with_type_prefix("Custom::");

    let artifact = runner.run_template(&diagram(&ws), "web").await.unwrap();

    assert_eq!(artifact.status, ArtifactStatus::Normally);
    let seed = seed_text(&gateway.conversation(0)).to_string();
    assert!(seed.contains("Custom::Seeder"));
    assert!(!seed.contains("AWS::IAM::Role"));
}

#[tokio::test]
async fn test_remote_validator_runs_after_structure_check() {
    let ws = Workspace::new();
    let gateway = ScriptedGateway::constant(fenced("yaml", BUCKET_TEMPLATE));
    let remote = ScriptedValidator::always_reject();
    let runner = JobRunner::new(gateway, MemoryCatalog::new(&["AWS::S3::Bucket"]), ws.store())
        .with_synthesis(settings(1, 0))
        .with_template_validator(remote.clone());

    let artifact = runner.run_template(&diagram(&ws), "web").await.unwrap();

    assert_eq!(artifact.status, ArtifactStatus::NotValidated);
    assert_eq!(artifact.review_count, 1);
    assert_eq!(remote.calls(), 1);
    assert!(artifact.file_name.ends_with("_notvalidated.yaml"));
}

#[tokio::test]
async fn test_catalog_failure_stores_nothing() {
    let ws = Workspace::new();
    let gateway = ScriptedGateway::constant(fenced("yaml", BUCKET_TEMPLATE));
    let runner = JobRunner::new(gateway.clone(), MemoryCatalog::unavailable(), ws.store());

    let err = runner.run_template(&diagram(&ws), "web").await.unwrap_err();

    assert!(matches!(err, AppError::Catalog(_)));
    assert_eq!(gateway.calls(), 0);
    assert!(ws.outputs().is_empty());
}

#[tokio::test]
async fn test_model_failure_stores_nothing() {
    let ws = Workspace::new();
    let gateway = ScriptedGateway::failing("connection reset");
    let runner = JobRunner::new(gateway, MemoryCatalog::new(&["AWS::S3::Bucket"]), ws.store());

    let err = runner.run_template(&diagram(&ws), "web").await.unwrap_err();

    assert!(matches!(err, AppError::Synthesis(_)));
    assert!(ws.outputs().is_empty());
}

#[tokio::test]
async fn test_unsupported_image_type_is_rejected() {
    let ws = Workspace::new();
    let image = ws.write("diagram.bmp", b"BM");
    let gateway = ScriptedGateway::constant(fenced("yaml", BUCKET_TEMPLATE));
    let runner = JobRunner::new(gateway.clone(), MemoryCatalog::new(&[]), ws.store());

    let err = runner.run_template(&image, "diagram").await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(gateway.calls(), 0);
}

// ============================================================================
// Parameter Sheet Jobs
// ============================================================================

const SAMPLE_SHEET: &str = "Resource,Property,Value\nBucketName,BucketName,example-bucket";

#[tokio::test]
async fn test_parameter_sheet_job_stores_csv() {
    let ws = Workspace::new();
    let template = ws.write("web.yaml", BUCKET_TEMPLATE.as_bytes());
    let sample = ws.write("sample.csv", SAMPLE_SHEET.as_bytes());
    let sheet = "Resource,Property,Value\nBucket,Type,AWS::S3::Bucket";
    let gateway = ScriptedGateway::new(vec![fenced("csv", sheet)]);
    let runner = JobRunner::new(gateway.clone(), MemoryCatalog::unavailable(), ws.store())
        .with_synthesis(settings(3, 0));

    let artifact = runner
        .run_parameter_sheet(&template, &sample, "web")
        .await
        .unwrap();

    assert_eq!(artifact.status, ArtifactStatus::Normally);
    assert!(artifact_pattern().is_match(&artifact.file_name));
    assert!(artifact.file_name.ends_with("_normally.csv"));
    assert_eq!(fs::read_to_string(&artifact.location).unwrap(), sheet);

    let seed = seed_text(&gateway.conversation(0)).to_string();
    assert!(seed.contains(SAMPLE_SHEET));
    assert!(seed.contains("Type: AWS::S3::Bucket"));
}

#[tokio::test]
async fn test_ragged_sheet_without_review_budget_is_error() {
    let ws = Workspace::new();
    let template = ws.write("web.yaml", BUCKET_TEMPLATE.as_bytes());
    let sample = ws.write("sample.csv", SAMPLE_SHEET.as_bytes());
    let gateway = ScriptedGateway::new(vec![fenced("csv", "a,b\n1,2,3")]);
    let runner = JobRunner::new(gateway, MemoryCatalog::unavailable(), ws.store())
        .with_synthesis(settings(0, 0));

    let artifact = runner
        .run_parameter_sheet(&template, &sample, "web")
        .await
        .unwrap();

    assert_eq!(artifact.status, ArtifactStatus::Error);
    assert!(artifact.file_name.ends_with("_error.csv"));
    assert_eq!(fs::read_to_string(&artifact.location).unwrap(), "a,b\n1,2,3");
}
