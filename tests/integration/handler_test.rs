//! Handler Integration Tests
//!
//! Object-upload events dispatched through `handle`, with inputs placed in
//! a temporary bucket directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use stackdraft::handler::{handle, HandlerResponse, InvocationEvent, FAILURE_BODY, SUCCESS_BODY};
use stackdraft::services::jobs::JobRunner;
use stackdraft::storage::objects::LocalObjectStore;

use super::support::{fenced, settings, MemoryCatalog, ScriptedGateway};

// ============================================================================
// Helper Functions
// ============================================================================

const TEMPLATE: &str = "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket";
const SHEET: &str = "Resource,Type\nBucket,AWS::S3::Bucket";

fn put_object(root: &Path, bucket: &str, key: &str, body: &[u8]) {
    let path = root.join("input").join(bucket).join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn outputs(root: &Path) -> Vec<String> {
    match fs::read_dir(root.join("output")) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn runner(temp: &TempDir, gateway: Arc<ScriptedGateway>) -> JobRunner {
    let store = Arc::new(LocalObjectStore::new(
        temp.path().join("input"),
        temp.path().join("output"),
    ));
    JobRunner::new(gateway, MemoryCatalog::new(&["AWS::S3::Bucket"]), store)
        .with_synthesis(settings(3, 0))
}

// ============================================================================
// Success Path
// ============================================================================

#[tokio::test]
async fn test_diagram_upload_produces_template() {
    let temp = tempfile::tempdir().unwrap();
    put_object(temp.path(), "uploads", "diagrams/app.png", b"\x89PNG\r\n\x1a\n");
    let gateway = ScriptedGateway::new(vec![fenced("yaml", TEMPLATE)]);

    let response = handle(
        &runner(&temp, gateway),
        &InvocationEvent::for_object("uploads", "diagrams/app.png"),
    )
    .await;

    assert_eq!(response, HandlerResponse::ok());
    assert_eq!(response.body, SUCCESS_BODY);
    let stored = outputs(temp.path());
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("app_"));
    assert!(stored[0].ends_with("_normally.yaml"));
}

#[tokio::test]
async fn test_template_upload_produces_parameter_sheet() {
    let temp = tempfile::tempdir().unwrap();
    put_object(temp.path(), "templates", "app_20240501120000_normally.yaml", TEMPLATE.as_bytes());
    let sample = temp.path().join("sample.csv");
    fs::write(&sample, "Resource,Type\nExample,AWS::SQS::Queue").unwrap();
    let gateway = ScriptedGateway::new(vec![fenced("csv", SHEET)]);

    let response = handle(
        &runner(&temp, gateway).with_sample_sheet(&sample),
        &InvocationEvent::for_object("templates", "app_20240501120000_normally.yaml"),
    )
    .await;

    assert!(response.is_success());
    let stored = outputs(temp.path());
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("app_20240501120000_normally_"));
    assert!(stored[0].ends_with("_normally.csv"));
}

// ============================================================================
// Failure Path
// ============================================================================

#[tokio::test]
async fn test_missing_object_is_internal_error() {
    let temp = tempfile::tempdir().unwrap();
    let gateway = ScriptedGateway::constant(fenced("yaml", TEMPLATE));

    let response = handle(
        &runner(&temp, gateway.clone()),
        &InvocationEvent::for_object("uploads", "missing.png"),
    )
    .await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, FAILURE_BODY);
    assert_eq!(gateway.calls(), 0);
    assert!(outputs(temp.path()).is_empty());
}

#[tokio::test]
async fn test_unknown_extension_is_internal_error() {
    let temp = tempfile::tempdir().unwrap();
    put_object(temp.path(), "uploads", "notes.txt", b"hello");
    let gateway = ScriptedGateway::constant(fenced("yaml", TEMPLATE));

    let response = handle(
        &runner(&temp, gateway.clone()),
        &InvocationEvent::for_object("uploads", "notes.txt"),
    )
    .await;

    assert_eq!(response, HandlerResponse::internal_error());
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_template_upload_without_sample_sheet_fails() {
    let temp = tempfile::tempdir().unwrap();
    put_object(temp.path(), "templates", "app.yaml", TEMPLATE.as_bytes());
    let gateway = ScriptedGateway::constant(fenced("csv", SHEET));

    let response = handle(
        &runner(&temp, gateway.clone()),
        &InvocationEvent::for_object("templates", "app.yaml"),
    )
    .await;

    assert_eq!(response.status_code, 500);
    assert_eq!(gateway.calls(), 0);
    assert!(outputs(temp.path()).is_empty());
}

#[tokio::test]
async fn test_event_without_records_fails() {
    let temp = tempfile::tempdir().unwrap();
    let gateway = ScriptedGateway::constant(fenced("yaml", TEMPLATE));
    let event: InvocationEvent = serde_json::from_str(r#"{"Records": []}"#).unwrap();

    let response = handle(&runner(&temp, gateway), &event).await;

    assert_eq!(response.status_code, 500);
}
