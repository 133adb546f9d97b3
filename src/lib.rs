//! Stackdraft - Rust Backend Library
//!
//! Turns architecture diagrams into CloudFormation templates, and templates
//! into parameter sheets, with a model that is asked to continue truncated
//! output and to repair documents its validators reject.
//! It includes:
//! - The invocation handler for object-upload events
//! - Business logic services (catalog, synthesis, jobs)
//! - Storage layer (config, object store)
//! - Data models and utilities

pub mod handler;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use handler::{handle, HandlerResponse, InvocationEvent};
pub use models::settings::AppConfig;
pub use services::jobs::{JobRunner, StoredArtifact};
pub use utils::error::{AppError, AppResult};
