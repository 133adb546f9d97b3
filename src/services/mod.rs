//! Services
//!
//! Business logic of the application.
//!
//! - `catalog` - resource type listing and the allow-list
//! - `synthesis` - generation, continuation and validator-driven review
//! - `jobs` - end-to-end template and parameter sheet runs

pub mod catalog;
pub mod jobs;
pub mod synthesis;

pub use catalog::{CatalogError, CliCatalog, FileCatalog, ResourceTypeCatalog};
pub use jobs::{JobRunner, StoredArtifact};
