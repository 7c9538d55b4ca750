//! imgmux server entry point.
//!
//! Boots the HTTP image-search aggregator: loads layered configuration, opens
//! the SQLite store (fatal on failure), starts the expired-response purger and
//! serves `/search` until interrupted. Logs are JSON on stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use imgmux_client::{ResponseCache, build_http_client, providers_from_config};
use imgmux_core::cache::spawn_purger;
use imgmux_core::{Aggregator, AppConfig, CacheDb, CredentialVerifier};

mod app;
mod auth;
mod error;
mod search;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let addr = config.socket_addr()?;

    tracing::info!(db_path = %config.db_path.display(), "opening cache database");
    let db = CacheDb::open(&config.db_path).await?;
    let _purger = spawn_purger(db.clone(), config.purge_interval());

    let http = build_http_client(&config)?;
    let cache = Arc::new(ResponseCache::new(db.clone()));
    let providers = providers_from_config(&config, &http, &cache)?;

    let state = app::AppState::new(Aggregator::new(providers), CredentialVerifier::new(db), config.debug.pretty_json);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "starting imgmux HTTP server");

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
