//! Synthesis Loop Integration Tests
//!
//! Drives the continuation engine and the review controller together with
//! scripted model replies and validator verdicts.

use std::sync::Arc;

use stackdraft::models::document::{ArtifactStatus, DocumentKind};
use stackdraft::services::synthesis::{
    ContinuationEngine, RelativeLengthThreshold, SeedInstruction, SynthesisController,
    SynthesisError, SynthesisOutcome,
};
use stackdraft_llm::LlmError;
use stackdraft_quality_gates::{DocumentValidator, ValidationOutcome};

use super::support::{fenced, seed_text, ScriptedGateway, ScriptedValidator};

// ============================================================================
// Helper Functions
// ============================================================================

const LAMBDA_ONLY: &str = "Resources:\n  Fn:\n    Type: AWS::Lambda::Function";
const LAMBDA_WITH_ROLE: &str = "Resources:\n  Fn:\n    Type: AWS::Lambda::Function\n    Properties:\n      Role: !GetAtt FnRole.Arn\n  FnRole:\n    Type: AWS::IAM::Role";

fn controller(
    gateway: Arc<ScriptedGateway>,
    validator: Arc<dyn DocumentValidator>,
    max_review_count: u32,
    max_continuation_turns: u32,
) -> SynthesisController {
    let engine = ContinuationEngine::new(
        gateway,
        Arc::new(RelativeLengthThreshold::new(0.8)),
        max_continuation_turns,
        4096,
    );
    SynthesisController::new(engine, validator, max_review_count)
}

async fn run(controller: &SynthesisController) -> Result<SynthesisOutcome, SynthesisError> {
    controller
        .run(DocumentKind::Template, SeedInstruction::text("draw me a stack"))
        .await
}

// ============================================================================
// Review Cycle
// ============================================================================

#[tokio::test]
async fn test_rejection_feeds_document_and_error_into_review() {
    let gateway = ScriptedGateway::new(vec![
        fenced("yaml", LAMBDA_ONLY),
        fenced("yaml", LAMBDA_WITH_ROLE),
    ]);
    let validator = ScriptedValidator::new(vec![
        ValidationOutcome::rejected("missing IAM role"),
        ValidationOutcome::accepted("ok"),
    ]);

    let outcome = run(&controller(gateway.clone(), validator.clone(), 3, 0))
        .await
        .unwrap();

    assert_eq!(outcome.status, ArtifactStatus::Normally);
    assert_eq!(outcome.document, LAMBDA_WITH_ROLE);
    assert_eq!(outcome.review_count, 1);
    assert_eq!(outcome.validator_calls, 2);
    assert_eq!(
        *validator.documents.lock().unwrap(),
        vec![LAMBDA_ONLY.to_string(), LAMBDA_WITH_ROLE.to_string()]
    );

    // The review invocation starts a fresh conversation seeded with both
    let review = gateway.conversation(1);
    assert_eq!(review.len(), 1);
    let seed = seed_text(&review);
    assert!(seed.contains(LAMBDA_ONLY));
    assert!(seed.contains("missing IAM role"));
}

#[tokio::test]
async fn test_always_rejecting_validator_exhausts_budget() {
    let docs = ["doc: 0", "doc: 1", "doc: 2", "doc: 3"];
    let gateway = ScriptedGateway::new(docs.iter().map(|d| fenced("yaml", d)).collect());
    let validator = ScriptedValidator::always_reject();

    let outcome = run(&controller(gateway.clone(), validator.clone(), 3, 0))
        .await
        .unwrap();

    assert_eq!(outcome.status, ArtifactStatus::NotValidated);
    assert_eq!(outcome.review_count, 3);
    assert_eq!(validator.calls(), 3);
    assert_eq!(gateway.calls(), 4);
    // The third review's document is delivered without another validation
    assert_eq!(outcome.document, "doc: 3");
    assert_eq!(
        *validator.documents.lock().unwrap(),
        vec!["doc: 0", "doc: 1", "doc: 2"]
    );

    for review in 1..=3 {
        let seed = seed_text(&gateway.conversation(review)).to_string();
        assert!(seed.contains(docs[review - 1]));
        assert!(seed.contains(&format!("still wrong ({})", review)));
    }
}

#[tokio::test]
async fn test_immediate_acceptance_validates_once() {
    let gateway = ScriptedGateway::new(vec![fenced("yaml", LAMBDA_WITH_ROLE)]);
    let validator = ScriptedValidator::new(vec![ValidationOutcome::accepted("fine")]);

    let outcome = run(&controller(gateway.clone(), validator.clone(), 3, 0))
        .await
        .unwrap();

    assert_eq!(outcome.status, ArtifactStatus::Normally);
    assert_eq!(outcome.review_count, 0);
    assert_eq!(validator.calls(), 1);
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_no_review_budget_delivers_rejected_document() {
    let gateway = ScriptedGateway::new(vec![fenced("yaml", LAMBDA_ONLY)]);
    let validator = ScriptedValidator::always_reject();

    let outcome = run(&controller(gateway.clone(), validator.clone(), 0, 0))
        .await
        .unwrap();

    assert_eq!(outcome.status, ArtifactStatus::Error);
    assert_eq!(outcome.document, LAMBDA_ONLY);
    assert_eq!(validator.calls(), 1);
    assert_eq!(gateway.calls(), 1);
    assert_eq!(outcome.last_feedback.as_deref(), Some("still wrong (1)"));
}

#[tokio::test]
async fn test_same_script_gives_same_result() {
    let script = || {
        ScriptedGateway::new(vec![
            fenced("yaml", LAMBDA_ONLY),
            fenced("yaml", LAMBDA_WITH_ROLE),
        ])
    };
    let verdicts = || {
        ScriptedValidator::new(vec![
            ValidationOutcome::rejected("missing IAM role"),
            ValidationOutcome::accepted("ok"),
        ])
    };

    let first = run(&controller(script(), verdicts(), 3, 0)).await.unwrap();
    let second = run(&controller(script(), verdicts(), 3, 0)).await.unwrap();

    assert_eq!(first.document, second.document);
    assert_eq!(first.status, second.status);
    assert_eq!(first.review_count, second.review_count);
    assert_eq!(first.model_turns, second.model_turns);
}

// ============================================================================
// Continuation
// ============================================================================

#[tokio::test]
async fn test_truncated_generation_is_stitched_before_validation() {
    let head = "a".repeat(100);
    let middle = "b".repeat(90);
    let tail = "c".repeat(10);
    let gateway = ScriptedGateway::new(vec![
        fenced("yaml", &head),
        fenced("yaml", &middle),
        fenced("yaml", &tail),
    ]);
    let validator = ScriptedValidator::new(vec![ValidationOutcome::accepted("ok")]);

    let outcome = run(&controller(gateway.clone(), validator.clone(), 3, 5))
        .await
        .unwrap();

    let expected = format!("{}\n{}\n{}", head, middle, tail);
    assert_eq!(outcome.document, expected);
    assert_eq!(outcome.model_turns, 3);
    assert_eq!(*validator.documents.lock().unwrap(), vec![expected]);

    // Continuation turns extend the same conversation
    assert_eq!(gateway.conversation(2).len(), 5);
}

#[tokio::test]
async fn test_model_failure_during_review_is_fatal() {
    // Script ends after the generation reply, so the review call fails
    let gateway = ScriptedGateway::new(vec![fenced("yaml", LAMBDA_ONLY)]);
    let validator = ScriptedValidator::always_reject();

    let err = run(&controller(gateway, validator.clone(), 3, 0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::Model(LlmError::ProviderUnavailable { .. })
    ));
    assert_eq!(validator.calls(), 1);
}
