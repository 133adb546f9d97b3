//! Stackdraft Core
//!
//! Foundational error type and shared configuration data for the stackdraft
//! workspace. This crate depends on nothing else in the workspace.
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `proxy` - Outbound proxy settings used by the model gateway

pub mod error;
pub mod proxy;

pub use error::{CoreError, CoreResult};
pub use proxy::{ProxyConfig, ProxyProtocol};
