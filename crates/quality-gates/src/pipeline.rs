//! Validation Pipeline
//!
//! Runs an ordered list of gates against one document. Each gate has a mode
//! (Soft = warning only, Hard = blocking). The pipeline short-circuits on the
//! first hard rejection and returns that gate's feedback unchanged.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{GateReport, GateStatus, ValidationOutcome};
use crate::validator::{DocumentValidator, GateResult};

// ============================================================================
// Enums
// ============================================================================

/// Gate mode determining how rejections are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Warning only - rejections are reported but don't block the document
    Soft,
    /// Blocking - a rejection stops the pipeline
    #[default]
    Hard,
}

// ============================================================================
// Pipeline Result
// ============================================================================

/// Overall pipeline execution result.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Combined verdict
    pub outcome: ValidationOutcome,
    /// Per-gate reports in execution order, skipped gates included
    pub gate_reports: Vec<GateReport>,
    /// Total duration in milliseconds
    pub total_duration_ms: u64,
    /// Which gate caused the short-circuit (if any)
    pub short_circuit_gate: Option<String>,
}

// ============================================================================
// Validation Pipeline
// ============================================================================

struct PipelineStage {
    mode: GateMode,
    gate: Arc<dyn DocumentValidator>,
}

/// Ordered gates evaluated sequentially.
///
/// An empty pipeline accepts everything with an empty payload.
pub struct ValidationPipeline {
    name: String,
    stages: Vec<PipelineStage>,
}

impl ValidationPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a gate via builder pattern.
    pub fn with_gate(mut self, mode: GateMode, gate: Arc<dyn DocumentValidator>) -> Self {
        self.add_gate(mode, gate);
        self
    }

    /// Append a gate.
    pub fn add_gate(&mut self, mode: GateMode, gate: Arc<dyn DocumentValidator>) {
        self.stages.push(PipelineStage { mode, gate });
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every gate in order and collect the reports.
    pub async fn run(&self, document: &str) -> GateResult<PipelineResult> {
        let mut gate_reports = Vec::with_capacity(self.stages.len());
        let mut payloads = Vec::new();
        let mut hard_rejection: Option<(String, String)> = None;

        for stage in &self.stages {
            let gate_name = stage.gate.name().to_string();

            if hard_rejection.is_some() {
                gate_reports.push(GateReport::skipped(
                    &gate_name,
                    "Skipped after a blocking gate rejected the document",
                ));
                continue;
            }

            let start = Instant::now();
            let outcome = stage.gate.validate(document).await?;
            let duration_ms = start.elapsed().as_millis() as u64;
            gate_reports.push(GateReport::from_outcome(&gate_name, &outcome, duration_ms));

            match outcome {
                ValidationOutcome::Accepted { payload } => {
                    if !payload.is_empty() {
                        payloads.push(payload);
                    }
                }
                ValidationOutcome::Rejected { feedback } => match stage.mode {
                    GateMode::Hard => {
                        tracing::debug!(
                            pipeline = %self.name,
                            gate = %gate_name,
                            "hard gate rejected document"
                        );
                        hard_rejection = Some((gate_name, feedback));
                    }
                    GateMode::Soft => {
                        tracing::warn!(
                            pipeline = %self.name,
                            gate = %gate_name,
                            feedback = %feedback,
                            "soft gate rejected document; continuing"
                        );
                    }
                },
            }
        }

        let total_duration_ms = gate_reports.iter().map(|r| r.duration_ms).sum();
        let (outcome, short_circuit_gate) = match hard_rejection {
            Some((gate_name, feedback)) => (ValidationOutcome::rejected(feedback), Some(gate_name)),
            None => (ValidationOutcome::accepted(payloads.join("\n")), None),
        };

        Ok(PipelineResult {
            outcome,
            gate_reports,
            total_duration_ms,
            short_circuit_gate,
        })
    }

    /// Count gates that rejected in the given result.
    pub fn failed_gates(result: &PipelineResult) -> usize {
        result
            .gate_reports
            .iter()
            .filter(|r| r.status == GateStatus::Failed)
            .count()
    }
}

#[async_trait]
impl DocumentValidator for ValidationPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, document: &str) -> GateResult<ValidationOutcome> {
        let result = self.run(document).await?;
        tracing::debug!(
            pipeline = %self.name,
            gates = self.len(),
            failed = Self::failed_gates(&result),
            short_circuit = ?result.short_circuit_gate,
            duration_ms = result.total_duration_ms,
            "pipeline finished"
        );
        Ok(result.outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================
