//! Utilities
//!
//! Shared helpers used across the application.

pub mod error;
