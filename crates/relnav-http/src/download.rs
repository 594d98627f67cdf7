//! Streaming binary downloads
//!
//! Streams a response body to disk chunk by chunk, hashing as it goes. A
//! JSON response where a binary body was expected is decoded and surfaced as
//! a remote error instead of being written out, since APIs report failures
//! for binary endpoints as JSON payloads.

use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::cancel::CancelToken;
use crate::error::HttpError;
use crate::Result;

/// Outcome of a completed binary download
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Hex-encoded SHA-256 of the written content
    pub sha256: String,
}

pub(crate) async fn stream_to_file(
    response: reqwest::Response,
    dest: &Path,
    cancel: Option<CancelToken>,
) -> Result<DownloadedFile> {
    let status = response.status().as_u16();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));

    if !(200..300).contains(&status) || is_json {
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        return Err(HttpError::Remote { status, body });
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| HttpError::Transport(e.to_string()))?;
    let mut hasher = Sha256::new();
    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        if cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            return Err(HttpError::Cancelled);
        }

        let chunk = chunk.map_err(|e| HttpError::Transport(e.to_string()))?;
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        bytes_written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| HttpError::Transport(e.to_string()))?;

    let sha256 = format!("{:x}", hasher.finalize());
    tracing::info!(path = %dest.display(), bytes_written, sha256 = %sha256, "download complete");

    Ok(DownloadedFile {
        path: dest.to_path_buf(),
        bytes_written,
        sha256,
    })
}
