//! HTTP fetch pipeline with SSRF protection.
//!
//! ### Target URLs
//! - Parsed strictly: an absolute http(s) URL with a host, fragment removed.
//!
//! ### SSRF & Safety Gates
//! - Deny private ranges (RFC1918, link-local, localhost, etc.)
//! - Resolve DNS and validate all A/AAAA answers are public.
//! - Redirects are followed by hand so every hop gets the same DNS check.
//! - Max body bytes: 5MB (configurable)
//!
//! ### Forwarding
//! - [`FetchClient::forward`] replays a request as-is for the offline
//!   worker: no status check, no size cap, redirects never followed.

pub mod ssrf;
pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode, header};
use std::time::{Duration, Instant};

pub use ssrf::{SsrfError, check_host, validate_ip};
pub use url::{UrlError, origin_of, parse_target};

use folio_core::{AppConfig, Error, StoredResponse};

/// Headers that describe a single connection and must not be stored or
/// replayed.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "Mozilla/5.0 (compatible; LinkPreviewBot/1.0)")
    pub user_agent: String,

    /// Accept header sent by [`FetchClient::fetch`] (default: "text/html")
    pub accept: String,

    /// Maximum response body size in bytes for [`FetchClient::fetch`] (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 5s)
    pub timeout: Duration,

    /// Maximum number of redirects [`FetchClient::fetch`] follows (default: 5)
    pub max_redirects: usize,

    /// Refuse targets resolving to private or reserved addresses (default: true)
    pub block_private_addresses: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; LinkPreviewBot/1.0)".to_string(),
            accept: "text/html".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(5000),
            max_redirects: 5,
            block_private_addresses: true,
        }
    }
}

impl FetchConfig {
    /// Settings for link preview requests.
    pub fn preview(config: &AppConfig) -> Self {
        Self {
            user_agent: config.preview_user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.preview_timeout(),
            block_private_addresses: config.block_private_addresses,
            ..Default::default()
        }
    }

    /// Settings for requests forwarded to the trusted site origin.
    pub fn origin(config: &AppConfig) -> Self {
        Self {
            user_agent: concat!("folio-edge/", env!("CARGO_PKG_VERSION")).to_string(),
            accept: "*/*".to_string(),
            max_bytes: config.max_bytes,
            timeout: config.origin_timeout(),
            max_redirects: 0,
            block_private_addresses: false,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Convert into the storable form, dropping hop-by-hop headers and
    /// header values that are not valid UTF-8.
    pub fn into_stored(self) -> StoredResponse {
        let headers = self
            .headers
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        StoredResponse::new(self.status.as_u16(), headers, self.bytes.to_vec())
    }
}

/// HTTP fetch client with safety checks.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Every hop, the first included, passes the SSRF check before it is
    /// requested. Non-2xx final statuses and oversized bodies are errors.
    /// No retry is attempted.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let mut current = url.clone();
        let mut hops = 0usize;

        let response = loop {
            self.admit(&current).await?;

            let response = self
                .http
                .get(current.as_str())
                .header(header::ACCEPT, &self.config.accept)
                .send()
                .await
                .map_err(send_error)?;

            if !response.status().is_redirection() {
                break response;
            }
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let Some(location) = location else {
                break response;
            };

            if hops >= self.config.max_redirects {
                return Err(Error::HttpError(format!("too many redirects (max {})", self.config.max_redirects)));
            }
            current = next_hop(&current, &location)?;
            hops += 1;
        };

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(send_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes, {} redirects)",
            url,
            current,
            fetch_ms,
            bytes.len(),
            hops
        );

        Ok(FetchResponse { url: url.clone(), status, bytes, headers, fetch_ms })
    }

    /// SSRF gate applied to each hop when private addresses are blocked.
    async fn admit(&self, url: &Url) -> Result<(), Error> {
        if self.config.block_private_addresses {
            check_host(url).await.map_err(|e| Error::SsrfBlocked(e.to_string()))?;
        }
        Ok(())
    }

    /// Replay a request unmodified and return whatever the server answered.
    ///
    /// Only transport failures (unreachable host, timeout) are errors.
    pub async fn forward(
        &self, method: &Method, url: &Url, headers: &[(String, String)], body: Bytes,
    ) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut request = self.http.request(method.clone(), url.as_str());
        for (name, value) in headers {
            if HOP_BY_HOP.contains(&name.to_ascii_lowercase().as_str()) || name.eq_ignore_ascii_case("host") {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(send_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(send_error)?;

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(%method, %url, status = status.as_u16(), fetch_ms, "forwarded request");

        Ok(FetchResponse { url: url.clone(), status, bytes, headers, fetch_ms })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// Resolve a `Location` header against the URL that returned it.
fn next_hop(current: &Url, location: &str) -> Result<Url, Error> {
    let next = current
        .join(location)
        .map_err(|e| Error::InvalidUrl(format!("redirect to {location}: {e}")))?;

    if !matches!(next.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("redirect to unsupported scheme: {next}")));
    }
    Ok(next)
}

fn send_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::HttpError(format!("network error: {}", err))
    }
}
