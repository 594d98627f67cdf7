//! Transport error types

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum HttpError {
    /// The caller cancelled the request via its [`crate::CancelHandle`]
    #[error("Request cancelled")]
    Cancelled,

    /// The transport completed but the remote reported a non-success status
    #[error("Remote responded with status {status}")]
    Remote { status: u16, body: Value },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Classify whether a transport failure is a caller-initiated cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled)
    }
}
