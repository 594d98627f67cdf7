//! The abstract transport boundary

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use relnav_links::Verb;

use crate::cancel::CancelToken;
use crate::download::DownloadedFile;
use crate::error::HttpError;
use crate::Result;

/// One outbound HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub verb: Verb,
    pub url: String,
    /// JSON payload for mutating verbs
    pub body: Option<Value>,
    /// Extra headers on top of the transport's defaults
    pub headers: Vec<(String, String)>,
    pub cancel: Option<CancelToken>,
}

impl HttpRequest {
    pub fn new(verb: Verb, url: impl Into<String>) -> Self {
        Self {
            verb,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            cancel: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Verb::Get, url)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Decoded response from the transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Capability the navigation engine consumes.
///
/// Implementations own transport policy (TLS, timeouts, retries); the engine
/// performs no retries of its own. Cancellation is reported as
/// [`HttpError::Cancelled`] and classified via [`HttpError::is_cancelled`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue one request and decode the response body
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Stream a binary body to `dest`. Transports without download support
    /// reject the call.
    async fn download(&self, request: HttpRequest, dest: &Path) -> Result<DownloadedFile> {
        let _ = (request, dest);
        Err(HttpError::Transport(
            "binary download not supported by this transport".to_string(),
        ))
    }
}
