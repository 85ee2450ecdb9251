//! courtside MCP server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use courtside_client::Courtside;
use courtside_core::{AppConfig, SweepTask, TtlCache};

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    tracing::info!(
        cdn = %config.cdn_base_url,
        sweep_interval_secs = config.sweep_interval_secs,
        "Starting courtside server on stdio transport"
    );

    let cache = TtlCache::new();
    let sweeper = SweepTask::spawn(cache.clone(), config.sweep_interval(), config.sweep_max_age());
    let service = Courtside::from_config(&config, cache).context("failed to build service")?;

    let handler = handler::CourtsideServer::new(Arc::new(service));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    sweeper.shutdown().await;
    tracing::info!("courtside server stopped");

    Ok(())
}
