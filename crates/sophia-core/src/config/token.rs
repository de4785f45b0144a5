//! Capability token configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for capability token issuance and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Value of the `iss` claim written on issue and required on validate.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWS algorithm name ("EdDSA", "RS256", "ES256", ...).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Environment variable containing the public key (PEM).
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Path to the public key file.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,

    /// Environment variable containing the private key (PEM).
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Path to the private key file.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Generate a process-local key pair when no private key resolves.
    /// Tokens signed this way cannot be verified by any other instance.
    #[serde(default)]
    pub ephemeral_keys: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            algorithm: default_algorithm(),
            public_key_env: None,
            public_key_file: None,
            private_key_env: None,
            private_key_file: None,
            ephemeral_keys: false,
        }
    }
}

impl TokenConfig {
    /// Resolve the public key from environment or file.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_key(self.public_key_env.as_deref(), self.public_key_file.as_ref())
    }

    /// Resolve the private key from environment or file.
    pub fn resolve_private_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_key(
            self.private_key_env.as_deref(),
            self.private_key_file.as_ref(),
        )
    }
}

fn resolve_key(env_var: Option<&str>, path: Option<&PathBuf>) -> Result<Option<String>, std::io::Error> {
    // Try environment variable first
    if let Some(env_var) = env_var {
        if let Ok(key) = std::env::var(env_var) {
            return Ok(Some(key.trim().to_string()));
        }
    }

    // Try file path
    if let Some(path) = path {
        if path.exists() {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }
    }

    Ok(None)
}

fn default_issuer() -> String {
    "sophia-ai".to_string()
}

fn default_algorithm() -> String {
    "EdDSA".to_string()
}
