//! relnav HTTP boundary
//!
//! The navigation engine talks to the network through the [`HttpClient`]
//! trait only. This crate defines that boundary (request/response types,
//! cancellation handles, error classification) and ships a reqwest-backed
//! implementation with cache busting and streaming binary downloads.

mod cancel;
mod client;
mod download;
mod error;
mod transport;

pub use cancel::{CancelHandle, CancelToken};
pub use client::{HttpClient, HttpRequest, HttpResponse};
pub use download::DownloadedFile;
pub use error::HttpError;
pub use transport::ReqwestClient;

pub type Result<T> = std::result::Result<T, HttpError>;
