//! Proxy Configuration Types
//!
//! Outbound proxy settings for the model gateway. The HTTP client factory
//! that consumes them lives in the `stackdraft-llm` crate.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Proxy protocol type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks5,
}

impl ProxyProtocol {
    /// Return the URL scheme string for this protocol.
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
        }
    }

    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Some(ProxyProtocol::Http),
            "https" => Some(ProxyProtocol::Https),
            "socks5" | "socks5h" => Some(ProxyProtocol::Socks5),
            _ => None,
        }
    }
}

/// Proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Only held in memory; never written back to a config file.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Build the proxy URL string (without auth).
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    /// Parse `scheme://[user[:password]@]host[:port][/path]`, the form
    /// accepted from the environment. Credentials are percent-decoded; a
    /// missing port falls back to the scheme's default when it has one.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let parsed = url::Url::parse(raw.trim())?;
        let protocol = ProxyProtocol::from_scheme(parsed.scheme()).ok_or_else(|| {
            CoreError::parse(format!("unsupported proxy scheme: {}", parsed.scheme()))
        })?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CoreError::parse(format!("proxy URL has no host: {}", raw)))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| CoreError::parse(format!("proxy URL has no port: {}", raw)))?;

        let username = match parsed.username() {
            "" => None,
            user => Some(decode_credential(user)?),
        };
        let password = parsed.password().map(decode_credential).transpose()?;

        Ok(Self {
            protocol,
            host: host.to_string(),
            port,
            username,
            password,
        })
    }
}

fn decode_credential(raw: &str) -> CoreResult<String> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CoreError::parse("proxy credentials are not valid UTF-8"))
}
