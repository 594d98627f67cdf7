//! Request execution
//!
//! One outbound hypermedia request: resolve resource -> link -> URL, issue it
//! through the transport, run the response-processor pipeline, and normalize
//! failures into the navigation error taxonomy. No retries happen here;
//! retry policy belongs to the transport or the caller.

use serde_json::Value;
use std::sync::Arc;

use relnav_cache::CacheKey;
use relnav_http::{HttpClient, HttpRequest};
use relnav_links::{expand_uri, LinkedResource, Params, Verb};

use crate::config::{NavigatorConfig, RequestOptions, RootEndpoint};
use crate::error::NavError;
use crate::Result;

#[derive(Clone)]
pub struct RequestExecutor {
    http: Arc<dyn HttpClient>,
    config: Arc<NavigatorConfig>,
}

impl RequestExecutor {
    pub fn new(http: Arc<dyn HttpClient>, config: Arc<NavigatorConfig>) -> Self {
        Self { http, config }
    }

    /// Execute one navigation step.
    ///
    /// With no relation this is the zero-segment root-index fetch; otherwise
    /// the link is resolved against `resource` (an absent resource then fails
    /// as malformed).
    pub async fn execute(
        &self,
        resource: Option<&Value>,
        rel: Option<&str>,
        params: &Params,
        options: &RequestOptions,
        cache_key: Option<&CacheKey>,
    ) -> Result<Value> {
        match rel {
            None => self.fetch_root_index(options, cache_key).await,
            Some(rel) => {
                self.follow_link(resource.unwrap_or(&Value::Null), rel, params, options, cache_key)
                    .await
            }
        }
    }

    /// Resolve a relation on a resource into a concrete URL.
    ///
    /// Pure: link extraction, verb restriction policy, template expansion.
    pub fn resolve_url(
        &self,
        resource: &Value,
        rel: &str,
        params: &Params,
        verb: Verb,
    ) -> Result<String> {
        let parsed = LinkedResource::parse(resource, &self.config.allowed_links_properties)?;
        let link = parsed.link_for(rel, verb, self.config.with_verbs_restrictions)?;
        Ok(expand_uri(&link.href, params))
    }

    async fn follow_link(
        &self,
        resource: &Value,
        rel: &str,
        params: &Params,
        options: &RequestOptions,
        cache_key: Option<&CacheKey>,
    ) -> Result<Value> {
        let verb = options.effective_verb();
        let url = self.resolve_url(resource, rel, params, verb)?;
        let request_id = uuid::Uuid::new_v4();

        tracing::debug!(
            request_id = %request_id,
            rel,
            verb = verb.as_str(),
            url = %url,
            "executing hypermedia request"
        );

        let response = self
            .http
            .fetch(self.build_request(verb, url, options))
            .await
            .map_err(|e| NavError::from_http(e, cache_key.cloned()))?;

        let body = self.run_processors(response.body, options).await?;

        tracing::debug!(request_id = %request_id, rel, "hypermedia request completed");
        Ok(body)
    }

    /// Fetch the root index resource.
    ///
    /// A static root endpoint short-circuits the network entirely. A fetched
    /// root is descended along `root_index_links_path` before being treated
    /// as the link source; segments missing from the payload keep the
    /// current value.
    pub async fn fetch_root_index(
        &self,
        options: &RequestOptions,
        cache_key: Option<&CacheKey>,
    ) -> Result<Value> {
        let url = match &self.config.root_endpoint {
            RootEndpoint::Static(resource) => return Ok(resource.clone()),
            RootEndpoint::Url(url) => url.clone(),
        };

        let response = self
            .http
            .fetch(self.build_request(Verb::Get, url, options))
            .await
            .map_err(|e| NavError::from_http(e, cache_key.cloned()))?;

        let mut index = response.body;
        for prop in self.config.root_index_links_path.split('.').filter(|p| !p.is_empty()) {
            if let Some(inner) = index.get(prop) {
                index = inner.clone();
            }
        }

        Ok(index)
    }

    fn build_request(&self, verb: Verb, url: String, options: &RequestOptions) -> HttpRequest {
        let mut request = HttpRequest::new(verb, url);
        request.headers = options.headers.clone();
        request.body = options.body.clone();
        request.cancel = options.cancel.clone();
        request
    }

    async fn run_processors(&self, mut body: Value, options: &RequestOptions) -> Result<Value> {
        for processor in &self.config.response_processors {
            body = processor(body, options.clone()).await?;
        }
        Ok(body)
    }
}
