//! Jobs
//!
//! End-to-end runs for each document kind: gather inputs, drive the
//! synthesis controller, name the artifact and store it. A fatal error
//! anywhere before the upload means nothing is stored.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use stackdraft_llm::create_provider;
use stackdraft_quality_gates::{
    CommandGate, DocumentValidator, GateMode, SheetStructureGate, TemplateStructureGate,
    ValidationPipeline,
};
use tracing::Instrument;

use crate::models::document::{artifact_file_name, timestamp_now, ArtifactStatus, DocumentKind};
use crate::models::settings::{AppConfig, SynthesisSettings};
use crate::services::catalog::{
    allow_list, drain_catalog, CliCatalog, FileCatalog, ResourceTypeCatalog,
};
use crate::services::synthesis::{
    prompts, ContinuationEngine, ImageAttachment, LlmGateway, ModelGateway,
    RelativeLengthThreshold, SeedInstruction, SynthesisController, SynthesisOutcome,
};
use crate::storage::objects::{LocalObjectStore, ObjectStore};
use crate::utils::error::{AppError, AppResult};

/// Artifact written by a finished job
#[derive(Debug, Clone, Serialize)]
pub struct StoredArtifact {
    pub file_name: String,
    pub location: String,
    pub status: ArtifactStatus,
    pub review_count: u32,
}

/// Runs template and parameter sheet jobs against shared collaborators
pub struct JobRunner {
    gateway: Arc<dyn ModelGateway>,
    catalog: Arc<dyn ResourceTypeCatalog>,
    store: Arc<dyn ObjectStore>,
    synthesis: SynthesisSettings,
    type_prefix: String,
    max_catalog_pages: usize,
    structure_check: bool,
    template_validator: Option<Arc<dyn DocumentValidator>>,
    sheet_validator: Arc<dyn DocumentValidator>,
    sample_sheet: Option<PathBuf>,
}

impl JobRunner {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        catalog: Arc<dyn ResourceTypeCatalog>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            store,
            synthesis: SynthesisSettings::default(),
            type_prefix: "AWS::".to_string(),
            max_catalog_pages: 100,
            structure_check: true,
            template_validator: None,
            sheet_validator: Arc::new(SheetStructureGate::new()),
            sample_sheet: None,
        }
    }

    pub fn with_synthesis(mut self, synthesis: SynthesisSettings) -> Self {
        self.synthesis = synthesis;
        self
    }

    pub fn with_type_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_prefix = prefix.into();
        self
    }

    pub fn with_max_catalog_pages(mut self, max_pages: usize) -> Self {
        self.max_catalog_pages = max_pages;
        self
    }

    /// Toggle the local structure and allow-list gate for templates
    pub fn with_structure_check(mut self, enabled: bool) -> Self {
        self.structure_check = enabled;
        self
    }

    /// External template validator run after the structure gate
    pub fn with_template_validator(mut self, validator: Arc<dyn DocumentValidator>) -> Self {
        self.template_validator = Some(validator);
        self
    }

    pub fn with_sample_sheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.sample_sheet = Some(path.into());
        self
    }

    /// Wire every collaborator from configuration
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let provider = create_provider(config.provider.clone())?;
        let gateway: Arc<dyn ModelGateway> = Arc::new(LlmGateway::new(provider));

        let catalog: Arc<dyn ResourceTypeCatalog> = match &config.catalog.file {
            Some(path) => Arc::new(FileCatalog::new(path)),
            None => Arc::new(CliCatalog::new(
                config.catalog.aws_program.clone(),
                config.catalog.timeout_secs,
            )),
        };

        let storage = &config.storage;
        let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
            storage.input_root.clone(),
            storage.output_dir.clone(),
        ));

        let mut runner = Self::new(gateway, catalog, store)
            .with_synthesis(config.synthesis.clone())
            .with_type_prefix(config.catalog.type_prefix.clone())
            .with_max_catalog_pages(config.catalog.max_pages)
            .with_structure_check(config.validation.structure_check);

        if let Some(command) = &config.validation.command {
            let gate = CommandGate::from_command_line(command)?
                .with_name("template-command")
                .with_timeout(config.validation.command_timeout_secs)
                .with_file_suffix(".yaml");
            runner = runner.with_template_validator(Arc::new(gate));
        }
        if let Some(sample) = &storage.sample_sheet {
            runner = runner.with_sample_sheet(sample.clone());
        }

        tracing::info!(
            provider = %config.provider.provider,
            model = %config.provider.model,
            remote_validator = config.validation.command.is_some(),
            "jobs: runner configured"
        );
        Ok(runner)
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Configured sample parameter sheet, if any
    pub fn sample_sheet(&self) -> Option<&Path> {
        self.sample_sheet.as_deref()
    }

    /// Diagram image to CloudFormation template
    pub async fn run_template(&self, image_path: &Path, input_name: &str) -> AppResult<StoredArtifact> {
        let span = tracing::info_span!("template_job", input = input_name);
        async move {
            let image = ImageAttachment::load(image_path).await?;

            let names = drain_catalog(self.catalog.as_ref(), self.max_catalog_pages).await?;
            let allowed = allow_list(names, &self.type_prefix);
            tracing::info!(allowed_types = allowed.len(), "jobs: allow-list ready");

            let validator = self.template_pipeline(&allowed);
            let seed = SeedInstruction::with_image(prompts::template_generation_seed(&allowed), image);

            let outcome = self
                .controller(validator)
                .run(DocumentKind::Template, seed)
                .await?;
            self.store_artifact(input_name, DocumentKind::Template, outcome)
                .await
        }
        .instrument(span)
        .await
    }

    /// Template plus sample sheet to CSV parameter sheet
    pub async fn run_parameter_sheet(
        &self,
        template_path: &Path,
        sample_sheet_path: &Path,
        input_name: &str,
    ) -> AppResult<StoredArtifact> {
        let span = tracing::info_span!("parameter_sheet_job", input = input_name);
        async move {
            let template = tokio::fs::read_to_string(template_path).await?;
            let sample = tokio::fs::read_to_string(sample_sheet_path).await?;
            if template.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "template is empty: {}",
                    template_path.display()
                )));
            }

            let seed = SeedInstruction::text(prompts::parameter_sheet_seed(&sample, &template));
            let outcome = self
                .controller(self.sheet_validator.clone())
                .run(DocumentKind::ParameterSheet, seed)
                .await?;
            self.store_artifact(input_name, DocumentKind::ParameterSheet, outcome)
                .await
        }
        .instrument(span)
        .await
    }

    fn template_pipeline(&self, allowed: &[String]) -> Arc<dyn DocumentValidator> {
        let mut pipeline = ValidationPipeline::new("template");
        if self.structure_check {
            let gate = TemplateStructureGate::new()
                .with_allowed_types(self.type_prefix.as_str(), allowed.iter().cloned());
            pipeline.add_gate(GateMode::Hard, Arc::new(gate));
        }
        if let Some(remote) = &self.template_validator {
            pipeline.add_gate(GateMode::Hard, remote.clone());
        }
        Arc::new(pipeline)
    }

    fn controller(&self, validator: Arc<dyn DocumentValidator>) -> SynthesisController {
        let engine = ContinuationEngine::new(
            self.gateway.clone(),
            Arc::new(RelativeLengthThreshold::new(
                self.synthesis.continuation_threshold,
            )),
            self.synthesis.max_continuation_turns,
            self.synthesis.max_output_tokens,
        );
        SynthesisController::new(engine, validator, self.synthesis.max_review_count)
    }

    async fn store_artifact(
        &self,
        input_name: &str,
        kind: DocumentKind,
        outcome: SynthesisOutcome,
    ) -> AppResult<StoredArtifact> {
        let file_name = artifact_file_name(input_name, &timestamp_now(), outcome.status, kind);
        let location = self
            .store
            .upload(&file_name, outcome.document.as_bytes())
            .await?;

        tracing::info!(
            file_name = %file_name,
            status = %outcome.status,
            review_count = outcome.review_count,
            model_turns = outcome.model_turns,
            "jobs: artifact stored"
        );
        Ok(StoredArtifact {
            file_name,
            location,
            status: outcome.status,
            review_count: outcome.review_count,
        })
    }
}
