//! showcase server entry point.
//!
//! Boots the HTTP server exposing the stats proxy, the merged showcase view
//! and the media relay. Logs are JSON on stderr.

use anyhow::Result;
use showcase_core::{AppConfig, CacheDb};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let listen_addr = config.listen_addr.clone();

    tracing::info!(db_path = %config.db_path.display(), "opening cache database");
    let db = CacheDb::open(&config.db_path).await?;
    let state = state::AppState::new(config, db).await?;

    let listener = TcpListener::bind(&listen_addr).await?;
    tracing::info!("Starting showcase server on {}", listen_addr);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
