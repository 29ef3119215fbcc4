//! folio-edge server entry point.
//!
//! Boots the offline cache dispatcher against the configured site origin
//! and serves the link preview API plus a caching proxy for everything else.
//! Logging goes to stderr as JSON.

use anyhow::Result;
use folio_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod headers;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = CacheDb::open(&config.db_path).await?;
    let state = handler::AppState::new(&config, db)?;

    handler::boot(&state.dispatcher).await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, origin = %config.site_origin, "Starting folio-edge");

    axum::serve(listener, handler::router(state)).await?;

    Ok(())
}
