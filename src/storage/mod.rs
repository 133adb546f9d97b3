//! Storage Layer
//!
//! Configuration loading and the object store for inputs and artifacts.

pub mod config;
pub mod objects;

pub use config::ConfigService;
pub use objects::{LocalObjectStore, ObjectStore};
