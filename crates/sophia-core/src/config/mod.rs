//! Configuration types for Sophia.
//!
//! Configuration is loaded from a single YAML file (`sophia.yaml`):
//!
//! ```yaml
//! project: sophia
//! token:
//!   issuer: sophia-ai
//!   algorithm: EdDSA
//!   private_key_file: keys/private.pem
//!   public_key_file: keys/public.pem
//! server:
//!   port: 3000
//! ```
//!
//! Relative key file paths are resolved against the directory containing the
//! configuration file when loaded through [`SophiaConfig::load_with_context`].

pub mod server;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use server::ServerConfig;
pub use token::TokenConfig;

/// Complete Sophia configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SophiaConfig {
    /// Project name.
    #[serde(default)]
    pub project: Option<String>,

    /// Capability token configuration.
    #[serde(default)]
    pub token: TokenConfig,

    /// Demo server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SophiaConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration and resolve key file paths relative to the file.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        config.token.private_key_file = config
            .token
            .private_key_file
            .take()
            .map(|p| relative_to(&base_dir, p));
        config.token.public_key_file = config
            .token
            .public_key_file
            .take()
            .map(|p| relative_to(&base_dir, p));

        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.token.issuer.trim().is_empty() {
            return Err(ConfigError::Config("token.issuer must not be empty".into()));
        }
        Ok(())
    }
}

fn relative_to(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
