//! Application state and router.
//!
//! The router serves the preview API directly and sends every other path
//! through the cache dispatcher's fallback proxy.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use folio_client::{CacheDispatcher, FetchClient, FetchConfig, PreviewFetcher, WorkerConfig};
use folio_core::{AppConfig, CacheDb, Error};

use crate::headers::security_headers;
use crate::routes::{og_preview::og_preview, proxy::proxy};

/// Dispatcher over the SQLite store and the origin client.
pub type Dispatcher = CacheDispatcher<CacheDb, Arc<FetchClient>>;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Client for requests the dispatcher passes through.
    pub origin: Arc<FetchClient>,
    pub preview: Arc<PreviewFetcher>,
    pub preview_cache_control: String,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, db: CacheDb) -> Result<Self, Error> {
        let origin = Arc::new(FetchClient::new(FetchConfig::origin(config))?);
        let worker = WorkerConfig::from_app_config(config)?;
        let dispatcher = Arc::new(CacheDispatcher::new(worker, db, origin.clone()));
        let preview = Arc::new(PreviewFetcher::new(FetchConfig::preview(config))?);

        Ok(Self {
            dispatcher,
            origin,
            preview,
            preview_cache_control: format!("public, max-age={}", config.preview_max_age_secs),
            max_body_bytes: config.max_bytes,
        })
    }
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/og-preview", get(og_preview))
        .fallback(proxy)
        .with_state(state)
        .layer(middleware::from_fn(security_headers))
}

/// Install then activate the dispatcher.
///
/// Failures are logged; the server keeps running and passes requests
/// straight to the origin.
pub async fn boot(dispatcher: &Dispatcher) {
    if let Err(e) = dispatcher.install().await {
        tracing::error!(code = e.code(), error = %e, "install failed; serving in pass-through mode");
        return;
    }

    match dispatcher.activate().await {
        Ok(deleted) => tracing::info!(deleted = deleted.len(), "cache dispatcher active"),
        Err(e) => tracing::error!(code = e.code(), error = %e, "activation failed; serving in pass-through mode"),
    }
}
