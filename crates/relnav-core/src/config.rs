//! Navigator configuration

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use relnav_cache::CacheStrategy;
use relnav_http::CancelToken;
use relnav_links::{Verb, DEFAULT_LINK_PROPERTIES};

use crate::Result;

/// Where the zero-segment root-index fetch goes
#[derive(Debug, Clone)]
pub enum RootEndpoint {
    /// Fetch the index from this URL
    Url(String),
    /// Static fallback resource; bypasses the network entirely
    Static(Value),
}

impl Default for RootEndpoint {
    fn default() -> Self {
        RootEndpoint::Url("/index".to_string())
    }
}

/// Per-call request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Verb override; `get` by default
    pub verb: Option<Verb>,
    /// JSON payload for mutating verbs
    pub body: Option<Value>,
    /// Extra headers on top of the transport's defaults
    pub headers: Vec<(String, String)>,
    pub cancel: Option<CancelToken>,
}

impl RequestOptions {
    pub fn verb(verb: Verb) -> Self {
        Self {
            verb: Some(verb),
            ..Default::default()
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn effective_verb(&self) -> Verb {
        self.verb.unwrap_or(Verb::Get)
    }
}

/// Hook run against each response before it is returned or cached.
///
/// Processors run in configuration order and short-circuit on the first
/// failure.
pub type ResponseProcessor =
    Arc<dyn Fn(Value, RequestOptions) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

#[derive(Clone)]
pub struct NavigatorConfig {
    pub root_endpoint: RootEndpoint,
    /// Dotted path descended into the fetched root before it is treated as
    /// the link source; a missing segment keeps the current value
    pub root_index_links_path: String,
    /// Properties searched for a resource's link collection, in order
    pub allowed_links_properties: Vec<String>,
    pub cache_strategy: CacheStrategy,
    pub with_verbs_restrictions: bool,
    pub response_processors: Vec<ResponseProcessor>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            root_endpoint: RootEndpoint::default(),
            root_index_links_path: String::new(),
            allowed_links_properties: DEFAULT_LINK_PROPERTIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache_strategy: CacheStrategy::All,
            with_verbs_restrictions: false,
            response_processors: Vec::new(),
        }
    }
}

impl fmt::Debug for NavigatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorConfig")
            .field("root_endpoint", &self.root_endpoint)
            .field("root_index_links_path", &self.root_index_links_path)
            .field("allowed_links_properties", &self.allowed_links_properties)
            .field("cache_strategy", &self.cache_strategy)
            .field("with_verbs_restrictions", &self.with_verbs_restrictions)
            .field("response_processors", &self.response_processors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NavigatorConfig::default();
        assert_eq!(config.allowed_links_properties, vec!["links", "_links"]);
        assert_eq!(config.cache_strategy, CacheStrategy::All);
        assert!(!config.with_verbs_restrictions);
        match config.root_endpoint {
            RootEndpoint::Url(url) => assert_eq!(url, "/index"),
            other => panic!("Expected Url root endpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_effective_verb_defaults_to_get() {
        assert_eq!(RequestOptions::default().effective_verb(), Verb::Get);
        assert_eq!(RequestOptions::verb(Verb::Delete).effective_verb(), Verb::Delete);
    }
}
