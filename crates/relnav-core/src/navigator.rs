//! The navigator facade
//!
//! Composes link resolution, request execution and the single-flight cache
//! into path-based `get`, relation-based `follow`, uncached mutations and
//! binary downloads over one root index.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use relnav_cache::{CacheKey, CacheStrategy, NavigationCache};
use relnav_http::{DownloadedFile, HttpClient, HttpRequest};
use relnav_links::{Params, Verb};

use crate::config::{NavigatorConfig, RequestOptions, ResponseProcessor, RootEndpoint};
use crate::error::NavError;
use crate::executor::RequestExecutor;
use crate::Result;

/// Cache prefix namespace for `follow`, keeping single-hop keys clear of
/// `get`-driven path keys
const FOLLOWED_PREFIX: &str = "followed";

/// Resource argument of the mutation operations
#[derive(Debug, Clone)]
pub enum Target {
    /// Resolve against the root index
    Root,
    /// Resolve by navigating this `get` path first
    Path(String),
    /// Use this already-resolved resource
    Resource(Value),
}

impl From<&str> for Target {
    fn from(path: &str) -> Self {
        Target::Path(path.to_string())
    }
}

impl From<Value> for Target {
    fn from(resource: Value) -> Self {
        Target::Resource(resource)
    }
}

/// HATEOAS navigator over one root index.
///
/// Owns its cache store exclusively; a [`Navigator::nocache`] sibling gets a
/// fresh store, never a shared one.
pub struct Navigator {
    config: Arc<NavigatorConfig>,
    http: Arc<dyn HttpClient>,
    executor: RequestExecutor,
    cache: NavigationCache<Value, NavError>,
    cache_disabled: bool,
}

impl Navigator {
    pub fn new(http: Arc<dyn HttpClient>, config: NavigatorConfig) -> Self {
        let config = Arc::new(config);
        let executor = RequestExecutor::new(Arc::clone(&http), Arc::clone(&config));
        Self {
            config,
            http,
            executor,
            cache: NavigationCache::new(),
            cache_disabled: false,
        }
    }

    pub fn builder(http: Arc<dyn HttpClient>) -> NavigatorBuilder {
        NavigatorBuilder::new(http)
    }

    /// Navigate a chain of relations (`a/b/c`) from the root index.
    ///
    /// Walks the segments left to right; each hop resolves against the
    /// previous hop's resource and goes through the cache under the active
    /// strategy. `params` and `suffixes` apply to the last segment only;
    /// intermediate hops are pure structural traversal.
    pub async fn get(
        &self,
        path: &str,
        params: Params,
        options: RequestOptions,
        suffixes: Vec<String>,
    ) -> Result<Value> {
        let mut steps: Vec<Option<String>> = vec![None];
        steps.extend(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(|s| Some(s.to_string())),
        );

        let total = steps.len();
        let mut prefixes: Vec<String> = Vec::new();
        let mut result: Option<Value> = None;

        for (i, step) in steps.into_iter().enumerate() {
            let last = i + 1 == total;
            let step_params = if last { params.clone() } else { Params::new() };
            let step_suffixes = if last { suffixes.clone() } else { Vec::new() };

            let mut segments = prefixes.clone();
            if let Some(rel) = &step {
                segments.push(rel.clone());
            }
            let key = CacheKey::new(segments, &step_params, step_suffixes);

            let strategy = self.effective_strategy(result.is_some() || step.is_some());
            let producer = self.producer(
                result.take(),
                step.clone(),
                step_params,
                options.clone(),
                key.clone(),
            );
            result = Some(self.cache.resolve(key, strategy, producer).await?);

            if let Some(rel) = step {
                prefixes.push(rel);
            }
        }

        Ok(result.unwrap_or(Value::Null))
    }

    /// Follow a single relation on an already-resolved resource.
    ///
    /// Cached under the `followed` prefix namespace unless the caller
    /// supplies its own prefixes.
    pub async fn follow(
        &self,
        resource: &Value,
        rel: &str,
        params: Params,
        options: RequestOptions,
        cache_prefixes: Option<Vec<String>>,
        cache_suffixes: Vec<String>,
    ) -> Result<Value> {
        let mut segments =
            cache_prefixes.unwrap_or_else(|| vec![FOLLOWED_PREFIX.to_string()]);
        segments.push(rel.to_string());
        let key = CacheKey::new(segments, &params, cache_suffixes);

        let strategy = self.effective_strategy(true);
        let producer = self.producer(
            Some(resource.clone()),
            Some(rel.to_string()),
            params,
            options,
            key.clone(),
        );
        self.cache.resolve(key, strategy, producer).await
    }

    /// POST a payload through a relation. Mutations never touch the cache.
    pub async fn post(
        &self,
        target: Target,
        rel: &str,
        payload: Value,
        options: RequestOptions,
        url_placeholders: Params,
    ) -> Result<Value> {
        self.mutate(target, rel, Verb::Post, Some(payload), options, url_placeholders)
            .await
    }

    /// PUT a payload through a relation. Mutations never touch the cache.
    pub async fn put(
        &self,
        target: Target,
        rel: &str,
        payload: Value,
        options: RequestOptions,
        url_placeholders: Params,
    ) -> Result<Value> {
        self.mutate(target, rel, Verb::Put, Some(payload), options, url_placeholders)
            .await
    }

    /// DELETE through a relation. Mutations never touch the cache.
    pub async fn delete(&self, target: Target, rel: &str, params: Params) -> Result<Value> {
        self.mutate(target, rel, Verb::Delete, None, RequestOptions::default(), params)
            .await
    }

    /// Resolve a relation to a URL and stream its binary body to `dest`.
    pub async fn download(
        &self,
        target: Target,
        rel: &str,
        params: Params,
        options: RequestOptions,
        dest: &Path,
    ) -> Result<DownloadedFile> {
        let resource = self.resolve_target(target).await?;
        let verb = options.effective_verb();
        let url = self.executor.resolve_url(&resource, rel, &params, verb)?;

        let mut request = HttpRequest::new(verb, url);
        request.headers = options.headers.clone();
        request.cancel = options.cancel.clone();

        self.http
            .download(request, dest)
            .await
            .map_err(|e| NavError::from_http(e, None))
    }

    /// Equivalent navigator that skips the cache for every hop beyond the
    /// root step. Shares configuration and transport with `self` but owns a
    /// fresh, independent store, so neither view disturbs the other.
    pub fn nocache(&self) -> Navigator {
        Navigator {
            config: Arc::clone(&self.config),
            http: Arc::clone(&self.http),
            executor: self.executor.clone(),
            cache: NavigationCache::new(),
            cache_disabled: true,
        }
    }

    /// Drop cached entries: the whole store without a path, the subtree
    /// under a path, or only the path's entries matching `params`.
    pub fn clear_cache(&self, path: Option<&str>, params: Option<&Params>) {
        match path {
            None => self.cache.reset(),
            Some(path) => {
                let segments: Vec<String> = path
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect();
                tracing::debug!(path, "clearing navigation cache subtree");
                self.cache.clear_subtree(&segments, params);
            }
        }
    }

    pub fn reset_cache(&self) {
        self.cache.reset();
    }

    /// Classify a navigation failure as a caller-initiated cancellation
    pub fn is_cancel(&self, err: &NavError) -> bool {
        err.is_cancel()
    }

    async fn mutate(
        &self,
        target: Target,
        rel: &str,
        verb: Verb,
        payload: Option<Value>,
        mut options: RequestOptions,
        params: Params,
    ) -> Result<Value> {
        let resource = self.resolve_target(target).await?;
        options.verb = Some(verb);
        if payload.is_some() {
            options.body = payload;
        }
        self.executor
            .execute(Some(&resource), Some(rel), &params, &options, None)
            .await
    }

    async fn resolve_target(&self, target: Target) -> Result<Value> {
        match target {
            Target::Root => {
                self.executor
                    .fetch_root_index(&RequestOptions::default(), None)
                    .await
            }
            Target::Path(path) => {
                self.get(&path, Params::new(), RequestOptions::default(), Vec::new())
                    .await
            }
            Target::Resource(resource) => Ok(resource),
        }
    }

    fn effective_strategy(&self, beyond_root: bool) -> CacheStrategy {
        if self.cache_disabled && beyond_root {
            CacheStrategy::Off
        } else {
            self.config.cache_strategy
        }
    }

    fn producer(
        &self,
        resource: Option<Value>,
        rel: Option<String>,
        params: Params,
        options: RequestOptions,
        key: CacheKey,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Value>> {
        let executor = self.executor.clone();
        move || {
            async move {
                executor
                    .execute(resource.as_ref(), rel.as_deref(), &params, &options, Some(&key))
                    .await
            }
            .boxed()
        }
    }
}

/// Ordered, explicit construction of a navigator.
///
/// Cross-cutting setup composes through [`NavigatorBuilder::apply`] instead
/// of any registry of named mixins.
pub struct NavigatorBuilder {
    http: Arc<dyn HttpClient>,
    config: NavigatorConfig,
}

impl NavigatorBuilder {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            config: NavigatorConfig::default(),
        }
    }

    pub fn root_endpoint(mut self, root: RootEndpoint) -> Self {
        self.config.root_endpoint = root;
        self
    }

    pub fn root_index_links_path(mut self, path: impl Into<String>) -> Self {
        self.config.root_index_links_path = path.into();
        self
    }

    pub fn allowed_links_properties(mut self, properties: Vec<String>) -> Self {
        self.config.allowed_links_properties = properties;
        self
    }

    pub fn cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.config.cache_strategy = strategy;
        self
    }

    pub fn with_verbs_restrictions(mut self, enforce: bool) -> Self {
        self.config.with_verbs_restrictions = enforce;
        self
    }

    pub fn response_processor(mut self, processor: ResponseProcessor) -> Self {
        self.config.response_processors.push(processor);
        self
    }

    /// Apply a construction-time decorator; decorators compose in call order
    pub fn apply(self, f: impl FnOnce(Self) -> Self) -> Self {
        f(self)
    }

    pub fn build(self) -> Navigator {
        Navigator::new(self.http, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use relnav_http::{HttpError, HttpResponse};
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn index() -> Value {
        json!({
            "links": [
                { "rel": "users", "href": "/users" },
                { "rel": "user", "href": "/users/{id}" },
            ]
        })
    }

    struct MockClient {
        routes: HashMap<String, Value>,
        failures: HashMap<String, HttpError>,
        delay: Option<Duration>,
        hits: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn new() -> Self {
            Self {
                routes: HashMap::new(),
                failures: HashMap::new(),
                delay: None,
                hits: Mutex::new(Vec::new()),
            }
        }

        fn route(mut self, verb: Verb, url: &str, body: Value) -> Self {
            self.routes.insert(format!("{} {url}", verb.as_method()), body);
            self
        }

        fn fail(mut self, verb: Verb, url: &str, error: HttpError) -> Self {
            self.failures
                .insert(format!("{} {url}", verb.as_method()), error);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn hit_count(&self, verb: Verb, url: &str) -> usize {
            let key = format!("{} {url}", verb.as_method());
            self.hits.lock().iter().filter(|h| **h == key).count()
        }

        fn total_hits(&self) -> usize {
            self.hits.lock().len()
        }
    }

    #[async_trait]
    impl HttpClient for MockClient {
        async fn fetch(&self, request: HttpRequest) -> relnav_http::Result<HttpResponse> {
            let key = format!("{} {}", request.verb.as_method(), request.url);
            self.hits.lock().push(key.clone());

            if let Some(delay) = self.delay {
                match request.cancel.clone() {
                    Some(token) => tokio::select! {
                        _ = token.cancelled() => return Err(HttpError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    },
                    None => tokio::time::sleep(delay).await,
                }
            }

            if let Some(error) = self.failures.get(&key) {
                return Err(error.clone());
            }
            match self.routes.get(&key) {
                Some(body) => Ok(HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: body.clone(),
                }),
                None => Err(HttpError::Remote {
                    status: 404,
                    body: Value::Null,
                }),
            }
        }

        async fn download(
            &self,
            request: HttpRequest,
            dest: &Path,
        ) -> relnav_http::Result<DownloadedFile> {
            self.hits
                .lock()
                .push(format!("DOWNLOAD {}", request.url));
            Ok(DownloadedFile {
                path: dest.to_path_buf(),
                bytes_written: 4,
                sha256: "cafe".to_string(),
            })
        }
    }

    fn navigator(mock: &Arc<MockClient>, root: Value) -> Navigator {
        Navigator::builder(Arc::clone(mock) as Arc<dyn HttpClient>)
            .root_endpoint(RootEndpoint::Static(root))
            .build()
    }

    #[tokio::test]
    async fn test_get_resolves_through_root_index() {
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users", json!({ "users": true })));
        let nav = navigator(&mock, index());

        let users = nav
            .get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(users, json!({ "users": true }));
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);
    }

    #[tokio::test]
    async fn test_get_expands_template_params() {
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users/22", json!({ "user": 22 })));
        let nav = navigator(&mock, index());

        let user = nav
            .get("user", params(json!({ "id": 22 })), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(user, json!({ "user": 22 }));
        assert_eq!(mock.hit_count(Verb::Get, "/users/22"), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_idempotence() {
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users", json!({ "users": true })));
        let nav = navigator(&mock, index());

        let first = nav
            .get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        let second = nav
            .get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);
    }

    #[tokio::test]
    async fn test_cache_isolated_by_params() {
        let mock = Arc::new(
            MockClient::new()
                .route(Verb::Get, "/users/1", json!({ "user": 1 }))
                .route(Verb::Get, "/users/2", json!({ "user": 2 })),
        );
        let nav = navigator(&mock, index());

        let one = nav
            .get("user", params(json!({ "id": 1 })), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        let two = nav
            .get("user", params(json!({ "id": 2 })), RequestOptions::default(), Vec::new())
            .await
            .unwrap();

        assert_eq!(one, json!({ "user": 1 }));
        assert_eq!(two, json!({ "user": 2 }));
        assert_eq!(mock.hit_count(Verb::Get, "/users/1"), 1);
        assert_eq!(mock.hit_count(Verb::Get, "/users/2"), 1);
    }

    #[tokio::test]
    async fn test_multi_segment_walk_params_on_last_hop_only() {
        let mock = Arc::new(
            MockClient::new()
                .route(
                    Verb::Get,
                    "/a",
                    json!({ "links": [{ "rel": "b", "href": "/a/b/{id}" }] }),
                )
                .route(Verb::Get, "/a/b/7", json!({ "b": 7 })),
        );
        let root = json!({ "links": [{ "rel": "a", "href": "/a" }] });
        let nav = navigator(&mock, root);

        let result = nav
            .get("a/b", params(json!({ "id": 7 })), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(result, json!({ "b": 7 }));
        // the intermediate hop resolved without the caller's params
        assert_eq!(mock.hit_count(Verb::Get, "/a"), 1);
        assert_eq!(mock.hit_count(Verb::Get, "/a/b/7"), 1);

        // the intermediate hop is cached independently
        nav.get("a", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(mock.hit_count(Verb::Get, "/a"), 1);
    }

    #[tokio::test]
    async fn test_strategy_off_never_caches() {
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users", json!({ "users": true })));
        let nav = Navigator::builder(Arc::clone(&mock) as Arc<dyn HttpClient>)
            .root_endpoint(RootEndpoint::Static(index()))
            .cache_strategy(CacheStrategy::Off)
            .build();

        for _ in 0..3 {
            nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
                .await
                .unwrap();
        }
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 3);
    }

    #[tokio::test]
    async fn test_strategy_root_index_only() {
        let mock = Arc::new(
            MockClient::new()
                .route(Verb::Get, "/index", index())
                .route(Verb::Get, "/users", json!({ "users": true })),
        );
        let nav = Navigator::builder(Arc::clone(&mock) as Arc<dyn HttpClient>)
            .root_endpoint(RootEndpoint::Url("/index".to_string()))
            .cache_strategy(CacheStrategy::RootIndexOnly)
            .build();

        for _ in 0..2 {
            nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
                .await
                .unwrap();
        }

        // root fetched once, the relation hop every time
        assert_eq!(mock.hit_count(Verb::Get, "/index"), 1);
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 2);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_request() {
        let mock = Arc::new(
            MockClient::new()
                .route(Verb::Get, "/users", json!({ "users": true }))
                .with_delay(Duration::from_millis(20)),
        );
        let nav = navigator(&mock, index());

        let (a, b) = tokio::join!(
            nav.get("users", Params::new(), RequestOptions::default(), Vec::new()),
            nav.get("users", Params::new(), RequestOptions::default(), Vec::new()),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);
    }

    #[tokio::test]
    async fn test_shared_failure_then_fresh_retry() {
        let mock = Arc::new(
            MockClient::new()
                .fail(
                    Verb::Get,
                    "/users",
                    HttpError::Remote { status: 500, body: json!({ "err": true }) },
                )
                .with_delay(Duration::from_millis(20)),
        );
        let nav = navigator(&mock, index());

        let (a, b) = tokio::join!(
            nav.get("users", Params::new(), RequestOptions::default(), Vec::new()),
            nav.get("users", Params::new(), RequestOptions::default(), Vec::new()),
        );

        // both concurrent callers observe the same failure from one request
        for result in [a, b] {
            match result.unwrap_err() {
                NavError::Remote { status, .. } => assert_eq!(status, 500),
                other => panic!("Expected Remote, got {other:?}"),
            }
        }
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);

        // the failure was evicted; a later call issues a brand-new request
        let _ = nav
            .get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await;
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 2);
    }

    #[tokio::test]
    async fn test_cancellation_does_not_poison_cache() {
        let mock = Arc::new(
            MockClient::new()
                .route(Verb::Get, "/users", json!({ "users": true }))
                .with_delay(Duration::from_millis(200)),
        );
        let nav = Arc::new(navigator(&mock, index()));

        let handle = relnav_http::CancelHandle::new();
        let options = RequestOptions::default().with_cancel(handle.token());

        let pending = {
            let nav = Arc::clone(&nav);
            tokio::spawn(async move {
                nav.get("users", Params::new(), options, Vec::new()).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        let err = pending.await.unwrap().unwrap_err();
        assert!(nav.is_cancel(&err));
        match &err {
            NavError::Cancelled { key: Some(key) } => {
                assert_eq!(key.segments(), ["users".to_string()]);
            }
            other => panic!("Expected Cancelled with key, got {other:?}"),
        }

        // no stale entry blocks the retry; a fresh request goes out
        let retried = nav
            .get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(retried, json!({ "users": true }));
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 2);
    }

    #[tokio::test]
    async fn test_verb_restrictions() {
        let root = json!({
            "links": [{
                "rel": "item",
                "href": "/items/1",
                "verbs": [{ "verb": "get" }]
            }]
        });
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/items/1", json!({ "item": 1 })));
        let nav = Navigator::builder(Arc::clone(&mock) as Arc<dyn HttpClient>)
            .root_endpoint(RootEndpoint::Static(root.clone()))
            .with_verbs_restrictions(true)
            .build();

        let err = nav
            .delete(Target::Resource(root), "item", Params::new())
            .await
            .unwrap_err();
        match err {
            NavError::Link(relnav_links::LinkError::VerbNotAllowed { rel, verb }) => {
                assert_eq!(rel, "item");
                assert_eq!(verb, "delete");
            }
            other => panic!("Expected VerbNotAllowed, got {other:?}"),
        }

        // get stays within the allow-list
        let item = nav
            .get("item", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(item, json!({ "item": 1 }));
    }

    #[tokio::test]
    async fn test_map_shaped_links_resolve_like_array_shaped() {
        let as_map = json!({ "links": { "users": { "href": "/users" } } });
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users", json!({ "users": true })));
        let nav = navigator(&mock, as_map);

        let users = nav
            .get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(users, json!({ "users": true }));
    }

    #[tokio::test]
    async fn test_clear_cache_is_selective() {
        let mock = Arc::new(
            MockClient::new()
                .route(Verb::Get, "/users", json!({ "users": true }))
                .route(Verb::Get, "/users/22", json!({ "user": 22 })),
        );
        let nav = navigator(&mock, index());
        let id_22 = params(json!({ "id": 22 }));

        nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        nav.get("user", id_22.clone(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();

        nav.clear_cache(Some("user"), Some(&id_22));

        // only the cleared entry re-fetches
        nav.get("user", id_22, RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(mock.hit_count(Verb::Get, "/users/22"), 2);
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);

        nav.reset_cache();
        nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 2);
    }

    #[tokio::test]
    async fn test_nocache_sibling_shares_no_state() {
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users", json!({ "users": true })));
        let nav = navigator(&mock, index());

        nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);

        let fresh = nav.nocache();
        for _ in 0..2 {
            fresh
                .get("users", Params::new(), RequestOptions::default(), Vec::new())
                .await
                .unwrap();
        }
        // every nocache hop goes to the network
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 3);

        // the parent's cached view is untouched
        nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 3);
    }

    #[tokio::test]
    async fn test_follow_caches_under_followed_namespace() {
        let mock = Arc::new(MockClient::new().route(Verb::Get, "/users", json!({ "users": true })));
        let nav = navigator(&mock, index());

        for _ in 0..2 {
            nav.follow(&index(), "users", Params::new(), RequestOptions::default(), None, Vec::new())
                .await
                .unwrap();
        }
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);

        // a get of the same rel lives under a different key space
        nav.get("users", Params::new(), RequestOptions::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 2);
    }

    #[tokio::test]
    async fn test_mutations_bypass_cache() {
        let users = json!({ "links": [{ "rel": "add", "href": "/users/add" }] });
        let mock = Arc::new(
            MockClient::new()
                .route(Verb::Get, "/users", users.clone())
                .route(Verb::Post, "/users/add", json!({ "created": true }))
                .route(Verb::Put, "/users/add", json!({ "updated": true }))
                .route(Verb::Delete, "/users/add", json!({ "deleted": true })),
        );
        let nav = navigator(&mock, index());

        for _ in 0..2 {
            let created = nav
                .post(
                    Target::Path("users".to_string()),
                    "add",
                    json!({ "name": "ada" }),
                    RequestOptions::default(),
                    Params::new(),
                )
                .await
                .unwrap();
            assert_eq!(created, json!({ "created": true }));
        }
        assert_eq!(mock.hit_count(Verb::Post, "/users/add"), 2);
        // the path target itself resolved through the cache
        assert_eq!(mock.hit_count(Verb::Get, "/users"), 1);

        let updated = nav
            .put(
                Target::Resource(users.clone()),
                "add",
                json!({ "name": "ada" }),
                RequestOptions::default(),
                Params::new(),
            )
            .await
            .unwrap();
        assert_eq!(updated, json!({ "updated": true }));

        let deleted = nav
            .delete(Target::Resource(users), "add", Params::new())
            .await
            .unwrap();
        assert_eq!(deleted, json!({ "deleted": true }));
    }

    #[tokio::test]
    async fn test_download_delegates_to_transport() {
        let root = json!({ "links": [{ "rel": "report", "href": "/reports/{id}" }] });
        let mock = Arc::new(MockClient::new());
        let nav = navigator(&mock, root);

        let file = nav
            .download(
                Target::Root,
                "report",
                params(json!({ "id": 9 })),
                RequestOptions::default(),
                Path::new("/tmp/report.pdf"),
            )
            .await
            .unwrap();
        assert_eq!(file.path, PathBuf::from("/tmp/report.pdf"));
        assert_eq!(mock.total_hits(), 1);
        assert_eq!(mock.hits.lock()[0], "DOWNLOAD /reports/9");
    }

    #[tokio::test]
    async fn test_builder_apply_composes_in_order() {
        let mock = Arc::new(MockClient::new());
        let nav = Navigator::builder(Arc::clone(&mock) as Arc<dyn HttpClient>)
            .apply(|b| b.root_endpoint(RootEndpoint::Static(index())))
            .apply(|b| b.cache_strategy(CacheStrategy::Off))
            .build();

        assert_eq!(nav.config.cache_strategy, CacheStrategy::Off);
        match &nav.config.root_endpoint {
            RootEndpoint::Static(_) => {}
            other => panic!("Expected static root, got {other:?}"),
        }
    }
}
