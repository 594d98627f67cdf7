//! Navigation error types
//!
//! The whole taxonomy is `Clone` because failed outcomes travel through
//! shared cache entries: every caller awaiting the same in-flight navigation
//! observes the same error value.

use serde_json::Value;
use thiserror::Error;

use relnav_cache::CacheKey;
use relnav_http::HttpError;
use relnav_links::LinkError;

#[derive(Error, Debug, Clone)]
pub enum NavError {
    /// Malformed resource, unknown relation, or verb restriction violation
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// Request cancelled by the caller; carries the cache key of the step so
    /// the entry can be invalidated
    #[error("Navigation cancelled")]
    Cancelled { key: Option<CacheKey> },

    /// Remote completed the exchange but reported a protocol-level failure
    #[error("Remote responded with status {status}")]
    Remote { status: u16, body: Value },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl NavError {
    /// True for caller-initiated cancellations, which callers usually ignore
    pub fn is_cancel(&self) -> bool {
        matches!(self, NavError::Cancelled { .. })
    }

    /// Normalize a transport failure into the navigation taxonomy
    pub(crate) fn from_http(err: HttpError, key: Option<CacheKey>) -> Self {
        match err {
            HttpError::Cancelled => NavError::Cancelled { key },
            HttpError::Remote { status, body } => NavError::Remote { status, body },
            HttpError::Transport(msg) => NavError::Transport(msg),
            HttpError::InvalidUrl(msg) => NavError::Transport(format!("invalid URL: {msg}")),
        }
    }
}
