//! Target URL parsing for outbound fetches.

/// Error type for target URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Parse a caller-supplied URL for fetching.
///
/// Unlike a browser address bar this never guesses a scheme: `example.com`
/// and `not-a-url` are rejected. Steps:
/// 1. Trim leading/trailing whitespace
/// 2. Parse as an absolute URL
/// 3. Require http or https and a host
/// 4. Remove fragment (#...)
pub fn parse_target(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// The serialized origin of a URL (`scheme://host[:port]`).
pub fn origin_of(url: &url::Url) -> String {
    url.origin().ascii_serialization()
}
