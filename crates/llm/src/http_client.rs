//! HTTP Client Factory
//!
//! Builds reqwest clients with proxy support and a request timeout.

use std::time::Duration;

use stackdraft_core::ProxyConfig;

use crate::types::{LlmError, LlmResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a `reqwest::Client` with the resolved proxy configuration.
///
/// - `Some(proxy)` -> configure proxy on the client
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
///
/// `timeout` bounds the whole request including reading the body.
pub fn build_http_client(
    proxy: Option<&ProxyConfig>,
    timeout: Duration,
) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT);
    match proxy {
        Some(cfg) => {
            let mut p = reqwest::Proxy::all(cfg.url()).map_err(|e| LlmError::InvalidRequest {
                message: format!("invalid proxy {}: {}", cfg.url(), e),
            })?;
            if let (Some(u), Some(pw)) = (&cfg.username, &cfg.password) {
                p = p.basic_auth(u, pw);
            }
            builder = builder.proxy(p);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("failed to build HTTP client: {}", e),
    })
}
