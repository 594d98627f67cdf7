//! reqwest-backed transport

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue};
use std::path::Path;
use std::sync::Arc;
use url::Url;

use relnav_links::Verb;

use crate::client::{HttpClient, HttpRequest, HttpResponse};
use crate::download::{stream_to_file, DownloadedFile};
use crate::error::HttpError;
use crate::Result;

type BusterFn = Arc<dyn Fn() -> String + Send + Sync>;

struct CacheBuster {
    callback: BusterFn,
    verbs: Vec<Verb>,
}

/// Production transport.
///
/// Owns connection policy (TLS, pooling, default headers); the navigation
/// engine above it owns none. Optionally appends a cache-busting `t` query
/// parameter to requests of configured verbs.
pub struct ReqwestClient {
    inner: reqwest::Client,
    base_url: Option<Url>,
    cachebuster: RwLock<Option<CacheBuster>>,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Client resolving relative hrefs against `base_url`
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        Self::build(Some(base))
    }

    fn build(base_url: Option<Url>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Ok(Self {
            inner,
            base_url,
            cachebuster: RwLock::new(None),
        })
    }

    /// Append `t=<callback()>` to every request whose verb is in `verbs`
    pub fn set_cache_buster(
        &self,
        callback: impl Fn() -> String + Send + Sync + 'static,
        verbs: Vec<Verb>,
    ) {
        *self.cachebuster.write() = Some(CacheBuster {
            callback: Arc::new(callback),
            verbs,
        });
    }

    /// Cache busting with the millisecond-timestamp default callback
    pub fn set_default_cache_buster(&self, verbs: Vec<Verb>) {
        self.set_cache_buster(Self::timestamp_buster, verbs);
    }

    pub fn remove_cache_buster(&self) {
        *self.cachebuster.write() = None;
    }

    /// Millisecond-timestamp buster, used when no callback is configured
    pub fn timestamp_buster() -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }

    fn build_url(&self, raw: &str, verb: Verb) -> Result<Url> {
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base
                    .join(raw)
                    .map_err(|e| HttpError::InvalidUrl(e.to_string()))?,
                None => {
                    return Err(HttpError::InvalidUrl(format!(
                        "relative URL [{raw}] without a configured base"
                    )))
                }
            },
            Err(e) => return Err(HttpError::InvalidUrl(e.to_string())),
        };

        if let Some(buster) = &*self.cachebuster.read() {
            if buster.verbs.contains(&verb) {
                url.query_pairs_mut().append_pair("t", &(buster.callback)());
            }
        }

        Ok(url)
    }

    async fn dispatch(&self, request: &HttpRequest, url: Url) -> Result<reqwest::Response> {
        let method = match request.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.inner.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(verb = request.verb.as_str(), url = %url, "dispatching request");

        builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))
    }

    async fn fetch_inner(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = self.build_url(&request.url, request.verb)?;
        let response = self.dispatch(request, url).await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(n, v)| (n.to_string(), String::from_utf8_lossy(v.as_bytes()).to_string()))
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let body = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        if !(200..300).contains(&status) {
            return Err(HttpError::Remote { status, body });
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        match request.cancel.clone() {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(HttpError::Cancelled),
                res = self.fetch_inner(&request) => res,
            },
            None => self.fetch_inner(&request).await,
        }
    }

    async fn download(&self, request: HttpRequest, dest: &Path) -> Result<DownloadedFile> {
        let url = self.build_url(&request.url, request.verb)?;
        let cancel = request.cancel.clone();

        let response = match cancel.clone() {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(HttpError::Cancelled),
                res = self.dispatch(&request, url) => res?,
            },
            None => self.dispatch(&request, url).await?,
        };

        stream_to_file(response, dest, cancel).await
    }
}
