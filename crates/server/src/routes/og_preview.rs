//! `GET /api/og-preview?url=…`
//!
//! Fetches the page at `url` and returns its Open Graph metadata as JSON.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::handler::AppState;

pub async fn og_preview(
    State(state): State<AppState>, Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    // first `url` wins when the parameter repeats
    let url = params
        .into_iter()
        .find_map(|(name, value)| (name == "url").then_some(value))
        .unwrap_or_default();
    if url.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    match state.preview.preview(&url).await {
        Ok(metadata) => {
            tracing::debug!(url = %url, "preview served");
            Ok(([(CACHE_CONTROL, state.preview_cache_control.clone())], Json(metadata)).into_response())
        }
        Err(e) => {
            tracing::error!(url = %url, code = e.code(), error = %e, "Error fetching OG data");
            Err(ApiError::PreviewFailed { url })
        }
    }
}
