//! Offline worker cache dispatcher.
//!
//! The dispatcher answers same-origin requests from a versioned store:
//! images and static assets cache-first, documents network-first with an
//! offline fallback page, API calls straight to the network. It moves
//! through the install/activate lifecycle before it answers anything.
//!
//! The store and the network are both traits ([`CacheStorage`] and
//! [`Network`]) so the dispatcher runs unchanged against SQLite and a
//! live origin, or against fakes in tests.

mod network;
mod request;

pub use network::Network;
pub use request::{Destination, InterceptedRequest, OnFailure, Strategy, WorkerConfig};

use folio_core::{CacheStorage, Error, RequestKey, StoredResponse};
use tokio::sync::RwLock;

/// Body of the synthetic response for an image that is neither stored nor
/// reachable.
const IMAGE_PLACEHOLDER: &str = "Image not available";

/// Response headers that belong to one requester and never enter the store.
const PERSONAL_HEADERS: &[&str] = &["set-cookie", "set-cookie2"];

/// Lifecycle of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this version never serves requests.
    Redundant,
}

/// Result of dispatching a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The worker produced this response.
    Respond(StoredResponse),
    /// The worker declined; send the request to the network unmodified.
    Passthrough,
}

/// Failures surfaced to the requester.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("NETWORK_ERROR: {0}")]
    Network(#[source] Error),

    #[error("OFFLINE: no stored copy of {0} and no offline page")]
    Offline(String),
}

/// Chooses and runs a caching strategy for each intercepted request.
pub struct CacheDispatcher<S, N> {
    config: WorkerConfig,
    storage: S,
    network: N,
    state: RwLock<WorkerState>,
}

impl<S: CacheStorage, N: Network> CacheDispatcher<S, N> {
    pub fn new(config: WorkerConfig, storage: S, network: N) -> Self {
        Self { config, storage, network, state: RwLock::new(WorkerState::Parsed) }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
    }

    /// Fetch every precache path and store the responses under the current
    /// store name.
    ///
    /// All-or-nothing: a transport failure or non-2xx status on any path
    /// stores nothing and leaves the worker redundant.
    pub async fn install(&self) -> Result<(), Error> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Parsed {
                return Err(Error::InvalidInput(format!("cannot install from {:?}", *state)));
            }
            *state = WorkerState::Installing;
        }

        match self.precache().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed).await;
                tracing::info!(cache = %self.config.cache_name, count, "precache complete");
                Ok(())
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                tracing::warn!(cache = %self.config.cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let mut entries = Vec::with_capacity(self.config.precache.len());

        for path in &self.config.precache {
            let request = InterceptedRequest::get(self.config.resolve(path)?, Destination::Other);
            let response = self
                .network
                .send(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;

            if !response.is_success() {
                return Err(Error::InstallFailed(format!("{path}: status {}", response.status)));
            }
            entries.push((request.cache_key(), response));
        }

        self.storage.open(&self.config.cache_name).await?;
        self.storage.put_all(&self.config.cache_name, &entries).await?;
        Ok(entries.len())
    }

    /// Delete every store except the current one and start controlling
    /// requests. Returns the names of the deleted stores.
    ///
    /// On a storage error the worker drops back to `Installed` so
    /// activation can be retried.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Installed {
                return Err(Error::InvalidInput(format!("cannot activate from {:?}", *state)));
            }
            *state = WorkerState::Activating;
        }

        match self.purge_old_stores().await {
            Ok(deleted) => {
                self.set_state(WorkerState::Activated).await;
                tracing::info!(cache = %self.config.cache_name, deleted = ?deleted, "activated");
                Ok(deleted)
            }
            Err(e) => {
                self.set_state(WorkerState::Installed).await;
                tracing::warn!(error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn purge_old_stores(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if name == self.config.cache_name {
                continue;
            }
            if self.storage.delete(&name).await? {
                tracing::debug!(cache = %name, "deleted old store");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Answer one request.
    ///
    /// Before activation every request passes through.
    pub async fn handle(&self, request: &InterceptedRequest) -> Result<Outcome, DispatchError> {
        if self.state().await != WorkerState::Activated {
            return Ok(Outcome::Passthrough);
        }

        match self.config.classify(request) {
            Strategy::Passthrough | Strategy::NetworkOnly => Ok(Outcome::Passthrough),
            Strategy::CacheFirst(on_failure) => self.cache_first(request, on_failure).await.map(Outcome::Respond),
            Strategy::NetworkFirst => self.network_first(request).await.map(Outcome::Respond),
        }
    }

    async fn cache_first(
        &self, request: &InterceptedRequest, on_failure: OnFailure,
    ) -> Result<StoredResponse, DispatchError> {
        let key = request.cache_key();
        if let Some(cached) = self.lookup(&key).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(cached);
        }

        match self.network.send(&request.unconditional()).await {
            Ok(response) => {
                if response.is_success() && shareable(request, &response) {
                    self.store(&key, &response).await;
                }
                Ok(response)
            }
            Err(e) => match on_failure {
                OnFailure::Placeholder => {
                    tracing::debug!(url = %request.url, error = %e, "image unavailable");
                    Ok(StoredResponse::text(404, IMAGE_PLACEHOLDER))
                }
                OnFailure::Propagate => Err(DispatchError::Network(e)),
            },
        }
    }

    async fn network_first(&self, request: &InterceptedRequest) -> Result<StoredResponse, DispatchError> {
        let key = request.cache_key();

        let error = match self.network.send(&request.unconditional()).await {
            Ok(response) => {
                if shareable(request, &response) {
                    self.store(&key, &response).await;
                }
                return Ok(response);
            }
            Err(e) => e,
        };
        tracing::debug!(url = %request.url, error = %error, "network failed; trying store");

        if let Some(cached) = self.lookup(&key).await {
            return Ok(cached);
        }

        if let Ok(offline) = self.config.resolve(&self.config.offline_path) {
            if let Some(page) = self.lookup(&RequestKey::get(offline.as_str())).await {
                return Ok(page);
            }
        }

        Err(DispatchError::Offline(request.url.to_string()))
    }

    /// Read errors count as misses.
    async fn lookup(&self, key: &RequestKey) -> Option<StoredResponse> {
        match self.storage.match_request(&self.config.cache_name, key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %key.url, error = %e, "store read failed");
                None
            }
        }
    }

    /// Write errors are logged; the response is still served.
    async fn store(&self, key: &RequestKey, response: &StoredResponse) {
        let mut shared = response.clone();
        shared
            .headers
            .retain(|(name, _)| !PERSONAL_HEADERS.contains(&name.to_ascii_lowercase().as_str()));

        if let Err(e) = self.storage.put(&self.config.cache_name, key, &shared).await {
            tracing::warn!(url = %key.url, error = %e, "store write failed");
        }
    }
}

/// Whether a response may be stored for every requester.
///
/// Credentialed requests, `304`s and responses marked `private` or
/// `no-store` stay out of the store.
fn shareable(request: &InterceptedRequest, response: &StoredResponse) -> bool {
    if request.header("authorization").is_some() || response.status == 304 {
        return false;
    }

    let Some(cache_control) = response.header("cache-control") else {
        return true;
    };
    !cache_control.split(',').any(|directive| {
        let directive = directive.trim().to_ascii_lowercase();
        directive == "no-store" || directive == "private" || directive.starts_with("private=")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::CacheDb;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use url::Url;

    const ORIGIN: &str = "https://example.com";

    /// Network fake: serves canned responses by path and counts calls.
    #[derive(Default)]
    struct FakeNetwork {
        routes: Mutex<HashMap<String, StoredResponse>>,
        calls: AtomicUsize,
        offline: AtomicBool,
    }

    impl FakeNetwork {
        fn route(&self, path: &str, response: StoredResponse) {
            self.routes.lock().unwrap().insert(path.to_string(), response);
        }

        fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Network for FakeNetwork {
        async fn send(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::HttpError("network error: offline".to_string()));
            }
            if request.header("if-none-match").is_some() {
                return Ok(StoredResponse::new(304, Vec::new(), Vec::<u8>::new()));
            }
            let routes = self.routes.lock().unwrap();
            Ok(routes
                .get(request.url.path())
                .cloned()
                .unwrap_or_else(|| StoredResponse::text(404, "not found")))
        }
    }

    /// Storage wrapper that counts every call.
    struct CountingStorage {
        inner: CacheDb,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl CountingStorage {
        fn touches(&self) -> usize {
            self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CacheStorage for CountingStorage {
        async fn open(&self, name: &str) -> Result<(), Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.open(name).await
        }

        async fn keys(&self) -> Result<Vec<String>, Error> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.keys().await
        }

        async fn delete(&self, name: &str) -> Result<bool, Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(name).await
        }

        async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.match_request(name, key).await
        }

        async fn put(&self, name: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.put(name, key, response).await
        }

        async fn put_all(&self, name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.put_all(name, entries).await
        }
    }

    type TestDispatcher = CacheDispatcher<Arc<CountingStorage>, Arc<FakeNetwork>>;

    fn url(path: &str) -> Url {
        Url::parse(&format!("{ORIGIN}{path}")).unwrap()
    }

    fn page(body: &str) -> StoredResponse {
        StoredResponse::new(200, vec![("content-type".into(), "text/html".into())], body.as_bytes())
    }

    async fn setup() -> (TestDispatcher, Arc<CountingStorage>, Arc<FakeNetwork>) {
        setup_with(WorkerConfig::new(Url::parse(ORIGIN).unwrap(), "folio-v1")).await
    }

    async fn setup_with(config: WorkerConfig) -> (TestDispatcher, Arc<CountingStorage>, Arc<FakeNetwork>) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let storage = Arc::new(CountingStorage { inner: db, reads: AtomicUsize::new(0), writes: AtomicUsize::new(0) });
        let network = Arc::new(FakeNetwork::default());
        for path in ["/", "/projects", "/experience"] {
            network.route(path, page(path));
        }
        network.route("/offline.html", page("offline"));

        let dispatcher = CacheDispatcher::new(config, storage.clone(), network.clone());
        (dispatcher, storage, network)
    }

    async fn activated() -> (TestDispatcher, Arc<CountingStorage>, Arc<FakeNetwork>) {
        let (dispatcher, storage, network) = setup().await;
        dispatcher.install().await.unwrap();
        dispatcher.activate().await.unwrap();
        (dispatcher, storage, network)
    }

    async fn stored(storage: &CountingStorage, path: &str) -> Option<StoredResponse> {
        storage
            .inner
            .match_request("folio-v1", &RequestKey::get(url(path).as_str()))
            .await
            .unwrap()
    }

    fn body(outcome: Outcome) -> String {
        match outcome {
            Outcome::Respond(response) => String::from_utf8(response.body).unwrap(),
            Outcome::Passthrough => panic!("expected a response"),
        }
    }

    #[tokio::test]
    async fn test_install_stores_manifest() {
        let (dispatcher, storage, network) = setup().await;
        assert_eq!(dispatcher.state().await, WorkerState::Parsed);

        dispatcher.install().await.unwrap();
        assert_eq!(dispatcher.state().await, WorkerState::Installed);
        assert_eq!(network.calls(), 4);

        for path in ["/", "/projects", "/experience", "/offline.html"] {
            assert!(stored(&storage, path).await.is_some(), "{path} not precached");
        }
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let (dispatcher, storage, network) = setup().await;
        network.route("/experience", StoredResponse::text(500, "boom"));

        let err = dispatcher.install().await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed(_)));
        assert_eq!(dispatcher.state().await, WorkerState::Redundant);

        assert!(stored(&storage, "/").await.is_none());
        assert!(storage.inner.store_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_fails_on_transport_error() {
        let (dispatcher, _storage, network) = setup().await;
        network.go_offline();

        assert!(dispatcher.install().await.is_err());
        assert!(dispatcher.activate().await.is_err());
        assert_eq!(dispatcher.state().await, WorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_activate_deletes_old_stores() {
        let (dispatcher, storage, _network) = setup().await;
        storage.inner.open_store("folio-v0").await.unwrap();
        storage.inner.open_store("unrelated").await.unwrap();

        dispatcher.install().await.unwrap();
        let mut deleted = dispatcher.activate().await.unwrap();
        deleted.sort();

        assert_eq!(deleted, vec!["folio-v0".to_string(), "unrelated".to_string()]);
        assert_eq!(storage.inner.store_names().await.unwrap(), vec!["folio-v1".to_string()]);
        assert_eq!(dispatcher.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let (dispatcher, _storage, _network) = setup().await;
        assert!(dispatcher.activate().await.is_err());
        assert_eq!(dispatcher.state().await, WorkerState::Parsed);
    }

    #[tokio::test]
    async fn test_passthrough_before_activation() {
        let (dispatcher, storage, network) = setup().await;
        dispatcher.install().await.unwrap();
        let before = (storage.touches(), network.calls());

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/"), Destination::Document))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Passthrough);
        assert_eq!((storage.touches(), network.calls()), before);
    }

    #[tokio::test]
    async fn test_image_cache_hit_skips_network() {
        let (dispatcher, storage, network) = activated().await;
        let key = RequestKey::get(url("/img/a.png").as_str());
        storage.inner.put_entry("folio-v1", &key, &page("cached-image")).await.unwrap();
        let calls = network.calls();

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/img/a.png"), Destination::Image))
            .await
            .unwrap();
        assert_eq!(body(outcome), "cached-image");
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_image_miss_fetches_and_stores() {
        let (dispatcher, storage, network) = activated().await;
        network.route("/img/b.png", page("fresh-image"));
        let request = InterceptedRequest::get(url("/img/b.png"), Destination::Image);

        assert_eq!(body(dispatcher.handle(&request).await.unwrap()), "fresh-image");
        assert!(stored(&storage, "/img/b.png").await.is_some());

        let calls = network.calls();
        assert_eq!(body(dispatcher.handle(&request).await.unwrap()), "fresh-image");
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_image_non_success_not_stored() {
        let (dispatcher, storage, _network) = activated().await;
        let request = InterceptedRequest::get(url("/img/missing.png"), Destination::Image);

        match dispatcher.handle(&request).await.unwrap() {
            Outcome::Respond(response) => assert_eq!(response.status, 404),
            Outcome::Passthrough => panic!("expected a response"),
        }
        assert!(stored(&storage, "/img/missing.png").await.is_none());
    }

    #[tokio::test]
    async fn test_image_offline_placeholder() {
        let (dispatcher, storage, network) = activated().await;
        network.go_offline();

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/img/c.png"), Destination::Image))
            .await
            .unwrap();
        let Outcome::Respond(response) = outcome else { panic!("expected a response") };
        assert_eq!(response.status, 404);
        assert_eq!(response.body, b"Image not available");
        assert!(stored(&storage, "/img/c.png").await.is_none());
    }

    #[tokio::test]
    async fn test_document_online_refreshes_store() {
        let (dispatcher, storage, network) = activated().await;
        network.route("/projects", page("projects v2"));

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/projects"), Destination::Document))
            .await
            .unwrap();
        assert_eq!(body(outcome), "projects v2");

        let entry = stored(&storage, "/projects").await.unwrap();
        assert_eq!(entry.body, b"projects v2");
    }

    #[tokio::test]
    async fn test_document_offline_serves_stored_copy() {
        let (dispatcher, _storage, network) = activated().await;
        network.go_offline();

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/projects"), Destination::Document))
            .await
            .unwrap();
        assert_eq!(body(outcome), "/projects");
    }

    #[tokio::test]
    async fn test_document_offline_falls_back_to_offline_page() {
        let (dispatcher, _storage, network) = activated().await;
        network.go_offline();

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/blog/never-seen"), Destination::Document))
            .await
            .unwrap();
        assert_eq!(body(outcome), "offline");
    }

    #[tokio::test]
    async fn test_document_offline_without_offline_page() {
        let mut config = WorkerConfig::new(Url::parse(ORIGIN).unwrap(), "folio-v1");
        config.precache = vec!["/".to_string()];
        let (dispatcher, _storage, network) = setup_with(config).await;
        dispatcher.install().await.unwrap();
        dispatcher.activate().await.unwrap();
        network.go_offline();

        let err = dispatcher
            .handle(&InterceptedRequest::get(url("/blog/post"), Destination::Document))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Offline(_)));
    }

    #[tokio::test]
    async fn test_api_requests_never_touch_store() {
        let (dispatcher, storage, network) = activated().await;
        let before = (storage.touches(), network.calls());

        for destination in [Destination::Other, Destination::Image, Destination::Document] {
            let outcome = dispatcher
                .handle(&InterceptedRequest::get(url("/api/og-preview?url=x"), destination))
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Passthrough);
        }
        assert_eq!((storage.touches(), network.calls()), before);
    }

    #[tokio::test]
    async fn test_cross_origin_passthrough() {
        let (dispatcher, storage, _network) = activated().await;
        let before = storage.touches();

        let request =
            InterceptedRequest::get(Url::parse("https://cdn.example.net/lib.js").unwrap(), Destination::Script);
        assert_eq!(dispatcher.handle(&request).await.unwrap(), Outcome::Passthrough);
        assert_eq!(storage.touches(), before);
    }

    #[tokio::test]
    async fn test_asset_offline_miss_propagates() {
        let (dispatcher, _storage, network) = activated().await;
        network.go_offline();

        let err = dispatcher
            .handle(&InterceptedRequest::get(url("/_astro/app.js"), Destination::Script))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Network(_)));
    }

    #[tokio::test]
    async fn test_asset_cache_first() {
        let (dispatcher, _storage, network) = activated().await;
        network.route("/styles/site.css", page("body{}"));
        let request = InterceptedRequest::get(url("/styles/site.css"), Destination::Style);

        assert_eq!(body(dispatcher.handle(&request).await.unwrap()), "body{}");
        network.go_offline();
        assert_eq!(body(dispatcher.handle(&request).await.unwrap()), "body{}");
    }

    #[tokio::test]
    async fn test_conditional_document_request_keeps_stored_copy() {
        let (dispatcher, storage, network) = activated().await;
        let request = InterceptedRequest::get(url("/"), Destination::Document).with_header("If-None-Match", "\"abc\"");

        let outcome = dispatcher.handle(&request).await.unwrap();
        assert_eq!(body(outcome), "/");

        let entry = stored(&storage, "/").await.unwrap();
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body, b"/");

        network.go_offline();
        assert_eq!(body(dispatcher.handle(&request).await.unwrap()), "/");
    }

    #[tokio::test]
    async fn test_not_modified_never_replaces_stored_copy() {
        let (dispatcher, storage, network) = activated().await;
        network.route("/projects", StoredResponse::new(304, Vec::new(), Vec::<u8>::new()));

        let outcome = dispatcher
            .handle(&InterceptedRequest::get(url("/projects"), Destination::Document))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Respond(ref r) if r.status == 304));

        let entry = stored(&storage, "/projects").await.unwrap();
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body, b"/projects");
    }

    #[tokio::test]
    async fn test_set_cookie_is_not_shared() {
        let (dispatcher, storage, network) = activated().await;
        let mut image = page("png-bytes");
        image.headers.push(("Set-Cookie".into(), "session=alice-secret".into()));
        network.route("/img/a.png", image);
        let request = InterceptedRequest::get(url("/img/a.png"), Destination::Image);

        let Outcome::Respond(first) = dispatcher.handle(&request).await.unwrap() else { panic!("expected a response") };
        assert_eq!(first.header("set-cookie"), Some("session=alice-secret"));

        let entry = stored(&storage, "/img/a.png").await.unwrap();
        assert!(entry.header("set-cookie").is_none());

        let Outcome::Respond(second) = dispatcher.handle(&request).await.unwrap() else { panic!("expected a response") };
        assert_eq!(second.body, b"png-bytes");
        assert!(second.header("set-cookie").is_none());
    }

    #[tokio::test]
    async fn test_private_responses_not_stored() {
        let (dispatcher, storage, network) = activated().await;
        for (path, directive) in [("/account", "private, max-age=0"), ("/inbox", "no-store")] {
            let mut response = page(path);
            response.headers.push(("Cache-Control".into(), directive.into()));
            network.route(path, response);

            let outcome = dispatcher
                .handle(&InterceptedRequest::get(url(path), Destination::Document))
                .await
                .unwrap();
            assert_eq!(body(outcome), path);
            assert!(stored(&storage, path).await.is_none(), "{path} was stored");
        }
    }

    #[tokio::test]
    async fn test_authorized_requests_not_stored() {
        let (dispatcher, storage, network) = activated().await;
        network.route("/img/avatar.png", page("avatar"));
        let request = InterceptedRequest::get(url("/img/avatar.png"), Destination::Image)
            .with_header("Authorization", "Bearer alice");

        assert_eq!(body(dispatcher.handle(&request).await.unwrap()), "avatar");
        assert!(stored(&storage, "/img/avatar.png").await.is_none());
    }

    #[test]
    fn test_shareable() {
        let request = InterceptedRequest::get(url("/"), Destination::Document);
        assert!(shareable(&request, &page("ok")));
        assert!(shareable(&request, &StoredResponse::text(500, "boom")));

        let mut public = page("ok");
        public.headers.push(("cache-control".into(), "public, max-age=60".into()));
        assert!(shareable(&request, &public));

        let mut private = page("ok");
        private.headers.push(("cache-control".into(), "Private=\"set-cookie\"".into()));
        assert!(!shareable(&request, &private));
    }
}
