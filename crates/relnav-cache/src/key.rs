//! Structural cache keys
//!
//! A key is the value identity of one navigation step: the path segments
//! walked so far, the canonical encoding of the step's parameters, and any
//! caller-supplied suffixes. Two navigations share an entry iff all three
//! components are equal by value.

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    segments: Vec<String>,
    params: String,
    suffixes: Vec<String>,
}

impl CacheKey {
    pub fn new(
        segments: Vec<String>,
        params: &Map<String, Value>,
        suffixes: Vec<String>,
    ) -> Self {
        Self {
            segments,
            params: canonical_params(params),
            suffixes,
        }
    }

    /// Key of the zero-segment root-index fetch
    pub fn root() -> Self {
        Self::new(Vec::new(), &Map::new(), Vec::new())
    }

    /// Root-index keys have no path segments, whatever their parameters
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn params(&self) -> &str {
        &self.params
    }

    /// Whether this key lives in the subtree rooted at `path`
    pub fn starts_with(&self, path: &[String]) -> bool {
        self.segments.len() >= path.len() && self.segments[..path.len()] == *path
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.segments.join("/"), self.params)?;
        if !self.suffixes.is_empty() {
            write!(f, "+{}", self.suffixes.join("/"))?;
        }
        Ok(())
    }
}

/// Deterministic parameter encoding.
///
/// `serde_json::Map` keeps keys sorted, so logically-equal parameter sets
/// encode identically regardless of the caller's insertion order.
pub(crate) fn canonical_params(params: &Map<String, Value>) -> String {
    Value::Object(params.clone()).to_string()
}
