//! relnav navigation cache
//!
//! Memoizes navigation outcomes under structural keys (path segments +
//! canonical parameter encoding). Entries are shared futures, so concurrent
//! navigations of the same key await one underlying operation: at most one
//! request is ever in flight per key. Failed entries are evicted before the
//! failure propagates, so the cache never replays an old error.

mod key;
mod store;
mod strategy;

pub use key::CacheKey;
pub use store::NavigationCache;
pub use strategy::CacheStrategy;
