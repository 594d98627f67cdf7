//! relnav core
//!
//! HATEOAS navigation over a generic HTTP transport: fetch a root index,
//! follow named relations (`a/b/c`) like filesystem paths, expand URI
//! templates from parameters, and memoize in-flight and settled results so
//! identical concurrent navigations collapse into one request.

mod config;
mod error;
mod executor;
mod navigator;

pub use config::{NavigatorConfig, RequestOptions, ResponseProcessor, RootEndpoint};
pub use error::NavError;
pub use executor::RequestExecutor;
pub use navigator::{Navigator, NavigatorBuilder, Target};

// Re-export the building blocks
pub use relnav_cache::{CacheKey, CacheStrategy, NavigationCache};
pub use relnav_http::{
    CancelHandle, CancelToken, DownloadedFile, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReqwestClient,
};
pub use relnav_links::{
    expand_uri, extract_links, Link, LinkError, LinkedResource, Params, Verb, VerbSpec,
};

pub type Result<T> = std::result::Result<T, NavError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
