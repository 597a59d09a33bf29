use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use rackmon_server::app;
use rackmon_server::config::ServerConfig;
use rackmon_server::state::AppState;

const DEFAULT_CONFIG_PATH: &str = "config/rackmon.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rackmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ServerConfig::load(&config_path)?;
    tracing::info!(
        config = %config_path,
        groups = config.groups.len(),
        "Configuration loaded"
    );

    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("invalid listen_address {}", config.listen_address))?;
    let state = AppState::new(config).context("failed to register exporter metrics")?;
    let app = app::build_http_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "rackmon-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
