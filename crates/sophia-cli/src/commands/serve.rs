//! `sophia serve` - Run the capability-guarded demo API.

use anyhow::Context;
use sophia_captoken::CapabilityTokenService;
use sophia_core::SophiaConfig;
use std::path::PathBuf;

/// Load configuration, falling back to defaults when no file is given.
pub fn load_config(path: Option<PathBuf>, ephemeral: bool) -> anyhow::Result<SophiaConfig> {
    let mut config = match path {
        Some(path) => SophiaConfig::load_with_context(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SophiaConfig::default(),
    };

    if ephemeral {
        config.token.ephemeral_keys = true;
    }
    Ok(config)
}

/// Run the demo server until Ctrl-C.
pub async fn run(config: SophiaConfig, port: Option<u16>) -> anyhow::Result<()> {
    let service = CapabilityTokenService::from_config(&config.token)
        .context("Failed to initialise token service (configure keys or pass --ephemeral)")?;

    let app = sophia_http::create_router(&service, &config.server.tenant);

    let mut server = config.server.clone();
    if let Some(port) = port {
        server.port = port;
    }
    let addr = server.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(
        addr = %addr,
        issuer = %service.issuer(),
        tenant = %config.server.tenant,
        "sophia demo API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_defaults_and_ephemeral_flag() {
        let config = load_config(None, false).unwrap();
        assert!(!config.token.ephemeral_keys);

        let config = load_config(None, true).unwrap();
        assert!(config.token.ephemeral_keys);
        assert!(CapabilityTokenService::from_config(&config.token).is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sophia.yaml");
        std::fs::write(&path, "server:\n  port: 9099\n  tenant: staging\n").unwrap();

        let config = load_config(Some(path), false).unwrap();
        assert_eq!(config.server.port, 9099);
        assert_eq!(config.server.tenant, "staging");
    }
}
