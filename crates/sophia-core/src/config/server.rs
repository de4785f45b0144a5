//! Demo HTTP server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the token-guarded demo API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP host.
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Tenant the guarded demo routes require.
    #[serde(default = "default_tenant")]
    pub tenant: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            tenant: default_tenant(),
        }
    }
}

impl ServerConfig {
    /// Socket address string, e.g. "127.0.0.1:3000".
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_tenant() -> String {
    crate::scope::DEFAULT_SERVICE_TENANT.to_string()
}
