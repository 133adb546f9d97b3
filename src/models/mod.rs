//! Data Models
//!
//! Configuration and document types shared by the services.

pub mod document;
pub mod settings;

pub use document::{ArtifactStatus, DocumentKind};
pub use settings::AppConfig;
