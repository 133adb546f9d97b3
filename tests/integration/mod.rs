//! Integration Tests Module
//!
//! End-to-end tests of the synthesis loop, the jobs runner and the
//! invocation handler, driven by scripted model and validator doubles and
//! temporary directories for the object store.

// Shared test doubles
mod support;

// Generate/validate/review loop behavior
mod controller_test;

// Template and parameter sheet jobs
mod jobs_test;

// Object-upload handler
mod handler_test;
