//! HTTP server configuration settings.

use std::{net::SocketAddr, path::PathBuf};

use serde::Deserialize;

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// Prefix in front of the authenticated business endpoints.
    pub api_prefix: String,
    /// Name shown in the welcome payload.
    pub project_name: String,
    /// Adds request ids and timings to every response and logs request details.
    pub debug_requests: bool,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// TLS configuration for secure connections.
    pub tls: Option<TlsConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            api_prefix: "/api/v1".to_string(),
            project_name: "DSP AI Gateway".to_string(),
            debug_requests: false,
            cors: CorsConfig::default(),
            tls: None,
        }
    }
}

/// Cross-origin settings. When enabled, every origin, method and header is allowed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    pub certificate: PathBuf,
    pub key: PathBuf,
}
