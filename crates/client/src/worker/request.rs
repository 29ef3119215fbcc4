//! Intercepted requests and strategy selection.

use bytes::Bytes;
use folio_core::{AppConfig, Error, RequestKey};
use reqwest::Method;
use url::Url;

/// Request headers that ask the origin to answer relative to a copy the
/// requester already holds.
const CONDITIONAL: &[&str] = &["if-none-match", "if-modified-since", "if-match", "if-unmodified-since", "if-range"];

/// What the requesting page intends to do with the response, as reported
/// by `Sec-Fetch-Dest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Other,
}

impl Destination {
    /// Parse a `Sec-Fetch-Dest` token. Unknown or empty tokens map to `Other`.
    pub fn from_fetch_dest(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" => Destination::Document,
            "image" => Destination::Image,
            "script" => Destination::Script,
            "style" => Destination::Style,
            "font" => Destination::Font,
            _ => Destination::Other,
        }
    }
}

/// A request the worker may answer.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    /// Headers forwarded to the network when the worker fetches.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl InterceptedRequest {
    pub fn new(method: Method, url: Url, destination: Destination) -> Self {
        Self { method, url, destination, headers: Vec::new(), body: Bytes::new() }
    }

    pub fn get(url: Url, destination: Destination) -> Self {
        Self::new(Method::GET, url, destination)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Copy without conditional headers, so the origin always answers with
    /// a full body that is safe to store.
    pub fn unconditional(&self) -> Self {
        let mut request = self.clone();
        request
            .headers
            .retain(|(name, _)| !CONDITIONAL.contains(&name.to_ascii_lowercase().as_str()));
        request
    }

    /// Descriptor the response is stored under.
    pub fn cache_key(&self) -> RequestKey {
        RequestKey::new(self.method.as_str(), self.url.as_str())
    }
}

/// What to do when a cache-first request misses and the network fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Answer with a synthetic 404 instead of failing.
    Placeholder,
    /// Surface the network error to the caller.
    Propagate,
}

/// Caching policy chosen for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve the stored copy; fetch and store only on a miss.
    CacheFirst(OnFailure),
    /// Fetch live; fall back to the stored copy, then the offline page.
    NetworkFirst,
    /// Go to the network without touching the store.
    NetworkOnly,
    /// Not ours to handle (cross-origin).
    Passthrough,
}

/// Static settings of one worker version.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Origin whose requests the worker controls.
    pub scope: Url,
    /// Versioned store name; the only store kept after activation.
    pub cache_name: String,
    /// Root-relative paths stored at install time.
    pub precache: Vec<String>,
    /// Root-relative path of the offline fallback page.
    pub offline_path: String,
    /// Path fragment marking network-only API requests.
    pub api_marker: String,
}

impl WorkerConfig {
    pub fn new(scope: Url, cache_name: impl Into<String>) -> Self {
        Self {
            scope,
            cache_name: cache_name.into(),
            precache: ["/", "/projects", "/experience", "/offline.html"]
                .into_iter()
                .map(String::from)
                .collect(),
            offline_path: "/offline.html".to_string(),
            api_marker: "/api/".to_string(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let scope = Url::parse(&config.site_origin)
            .map_err(|e| Error::InvalidUrl(format!("site_origin {}: {e}", config.site_origin)))?;

        Ok(Self {
            scope,
            cache_name: config.cache_name.clone(),
            precache: config.precache.clone(),
            offline_path: config.offline_path.clone(),
            api_marker: config.api_marker.clone(),
        })
    }

    /// Absolute URL of a root-relative path inside the scope.
    pub fn resolve(&self, path: &str) -> Result<Url, Error> {
        self.scope
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }

    /// Pick the caching policy for a request.
    ///
    /// API paths are checked before destinations so an image or page under
    /// the API marker still never touches the store.
    pub fn classify(&self, request: &InterceptedRequest) -> Strategy {
        if request.url.origin() != self.scope.origin() {
            return Strategy::Passthrough;
        }

        if request.url.path().contains(&self.api_marker) {
            return Strategy::NetworkOnly;
        }

        // stores only hold GET responses
        if request.method != Method::GET {
            return Strategy::NetworkOnly;
        }

        match request.destination {
            Destination::Image => Strategy::CacheFirst(OnFailure::Placeholder),
            Destination::Document => Strategy::NetworkFirst,
            _ => Strategy::CacheFirst(OnFailure::Propagate),
        }
    }
}
