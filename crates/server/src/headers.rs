//! Site-wide response header policy.
//!
//! Security headers go on every response; `Cache-Control` and `Vary` are
//! chosen by request path and applied to proxied site responses.

use std::sync::LazyLock;

use axum::extract::Request;
use axum::http::header::{CACHE_CONTROL, REFERRER_POLICY, VARY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use regex::Regex;

static STATIC_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(js|css|woff2?|jpg|jpeg|png|webp|avif)$").expect("static asset pattern is valid")
});

const IMMUTABLE: &str = "public, max-age=31536000, immutable";
const BLOG: &str = "public, max-age=3600, s-maxage=86400";
const REVALIDATE: &str = "public, max-age=0, must-revalidate";
const VARY_BY: &str = "Accept-Encoding, Cookie";

/// `Cache-Control` for a site path, if the path has a policy.
pub fn cache_policy_for(path: &str) -> Option<&'static str> {
    if STATIC_ASSET.is_match(path) {
        Some(IMMUTABLE)
    } else if path.starts_with("/blog/") {
        Some(BLOG)
    } else if path.ends_with(".html") || path == "/" || !path.contains('.') {
        Some(REVALIDATE)
    } else {
        None
    }
}

/// Whether responses for `path` vary by encoding and cookies.
pub fn varies_by_cookie(path: &str) -> bool {
    path == "/" || path.starts_with("/blog/")
}

/// Overwrite `Cache-Control` and `Vary` on a proxied response.
pub fn apply_cache_policy(path: &str, headers: &mut HeaderMap) {
    if let Some(policy) = cache_policy_for(path) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(policy));
    }
    if varies_by_cookie(path) {
        headers.insert(VARY, HeaderValue::from_static(VARY_BY));
    }
}

/// Middleware adding security headers to every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));
    response
}
