//! pwa-offline server entry point.
//!
//! Loads configuration, opens the store database, deploys the worker
//! (install, then activate unless configured to wait) and serves it over MCP
//! on stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pwa_offline_client::{FetchConfig, HttpNetwork, Worker};
use pwa_offline_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        store = %config.cache_name(),
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "Starting pwa-offline worker host on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(HttpNetwork::new(FetchConfig::from(&config))?);
    let worker = Arc::new(Worker::new(Arc::clone(&network), db.clone(), &config)?);

    match worker.start().await? {
        Some(report) => tracing::info!(deleted = ?report.deleted, failed = report.failed.len(), "worker active"),
        None => tracing::info!("worker waiting for SKIP_WAITING"),
    }

    let handler = handler::PwaOfflineServer::new(worker, network, db);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
