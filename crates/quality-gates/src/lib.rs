//! Stackdraft Quality Gates
//!
//! Validators that judge a generated document, and the pipeline that chains
//! them:
//!
//! - `models` - Outcome and report types (ValidationOutcome, GateStatus, GateReport)
//! - `validator` - The `DocumentValidator` trait and `GateError`
//! - `command` - External program gate (e.g. `aws cloudformation validate-template`)
//! - `template` - Local CloudFormation template structure gate
//! - `sheet` - Local CSV parameter sheet structure gate
//! - `pipeline` - Ordered Hard/Soft gate pipeline (ValidationPipeline, GateMode)

pub mod command;
pub mod models;
pub mod pipeline;
pub mod sheet;
pub mod template;
pub mod validator;

// Re-export core model types
pub use models::{GateReport, GateStatus, ValidationOutcome};

// Re-export the validator seam
pub use validator::{DocumentValidator, GateError, GateResult};

// Re-export gates
pub use command::CommandGate;
pub use sheet::SheetStructureGate;
pub use template::TemplateStructureGate;

// Re-export pipeline types
pub use pipeline::{GateMode, PipelineResult, ValidationPipeline};
