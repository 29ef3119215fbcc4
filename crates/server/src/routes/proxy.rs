//! Fallback route: every non-API request goes through the cache dispatcher.
//!
//! Requests the dispatcher declines are forwarded to the site origin as-is.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use folio_client::{Destination, InterceptedRequest, Network, Outcome};
use folio_core::StoredResponse;

use crate::error::ApiError;
use crate::handler::AppState;
use crate::headers::apply_cache_policy;

pub async fn proxy(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let intercepted = intercept(&state, request).await?;
    let path = intercepted.url.path().to_string();

    let stored = match state.dispatcher.handle(&intercepted).await? {
        Outcome::Respond(response) => response,
        Outcome::Passthrough => state.origin.send(&intercepted).await.map_err(|e| {
            tracing::warn!(url = %intercepted.url, error = %e, "origin unreachable");
            ApiError::BadGateway(e.to_string())
        })?,
    };

    let mut response = into_response(stored);
    apply_cache_policy(&path, response.headers_mut());
    Ok(response)
}

/// Rebuild the incoming request against the site origin.
async fn intercept(state: &AppState, request: Request) -> Result<InterceptedRequest, ApiError> {
    let (parts, body) = request.into_parts();

    let mut url = state.dispatcher.config().scope.clone();
    url.set_path(parts.uri.path());
    url.set_query(parts.uri.query());

    let destination = parts
        .headers
        .get("sec-fetch-dest")
        .and_then(|v| v.to_str().ok())
        .map_or(Destination::Other, Destination::from_fetch_dest);

    let body = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| ApiError::BadRequest(format!("request body: {e}")))?;

    let mut intercepted = InterceptedRequest::new(parts.method, url, destination).with_body(body);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            intercepted.headers.push((name.as_str().to_string(), value.to_string()));
        }
    }
    Ok(intercepted)
}

fn into_response(stored: StoredResponse) -> Response {
    let mut response = Response::new(Body::from(stored.body));
    *response.status_mut() = StatusCode::from_u16(stored.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let headers = response.headers_mut();
    for (name, value) in &stored.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            headers.append(name, value);
        }
    }
    response
}
