//! Structured errors for the folio-edge server.
//!
//! Each variant maps to one HTTP status and a JSON `{"error": ...}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_client::DispatchError;
use serde_json::json;

/// Structured errors for the folio-edge server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The preview endpoint was called without a `url`.
    #[error("URL parameter is required")]
    MissingUrl,

    /// Any preview failure, malformed URL included.
    #[error("Failed to fetch preview")]
    PreviewFailed { url: String },

    /// The proxied request could not be read.
    #[error("INVALID_INPUT: {0}")]
    BadRequest(String),

    /// The origin could not be reached and nothing was stored.
    #[error("NETWORK_ERROR: {0}")]
    BadGateway(String),

    /// Offline with neither a stored copy nor an offline page.
    #[error("OFFLINE: {0}")]
    Offline(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PreviewFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Offline(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Network(e) => ApiError::BadGateway(e.to_string()),
            DispatchError::Offline(url) => ApiError::Offline(url),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::PreviewFailed { url } => json!({ "error": self.to_string(), "url": url }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
