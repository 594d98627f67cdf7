//! Single-flight entry store

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::key::{canonical_params, CacheKey};
use crate::strategy::CacheStrategy;

type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Keyed store of pending-or-settled navigation outcomes.
///
/// Owned by exactly one navigator; a `nocache()` sibling gets its own store.
/// Entries are shared futures, so every caller that looks up a key while its
/// producer is still running awaits the same operation.
pub struct NavigationCache<T, E> {
    entries: Mutex<HashMap<CacheKey, SharedOutcome<T, E>>>,
}

impl<T: Clone, E: Clone> Default for NavigationCache<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> NavigationCache<T, E>
where
    T: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `key` through the cache under the given strategy.
    ///
    /// Steps the strategy excludes bypass the store entirely: no read, no
    /// write. Otherwise the first caller for a key inserts the pending
    /// outcome before awaiting it, so concurrent callers share one producer
    /// run. A failed outcome is evicted before the error is returned; the
    /// next call for the same key starts fresh.
    pub async fn resolve<F>(&self, key: CacheKey, strategy: CacheStrategy, producer: F) -> Result<T, E>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T, E>>,
    {
        if !strategy.caches(&key) {
            return producer().await;
        }

        // check-then-insert happens under one lock acquisition, and the lock
        // is released before awaiting
        let entry = {
            let mut entries = self.entries.lock();
            match entries.get(&key) {
                Some(existing) => {
                    tracing::debug!(key = %key, "navigation cache hit");
                    existing.clone()
                }
                None => {
                    let entry = producer().shared();
                    entries.insert(key.clone(), entry.clone());
                    tracing::debug!(key = %key, "navigation cache miss, entry pending");
                    entry
                }
            }
        };

        let outcome = entry.clone().await;
        if outcome.is_err() {
            // evict only if the stored entry is still the one that failed;
            // a concurrent retry may already have replaced it
            let mut entries = self.entries.lock();
            if entries.get(&key).is_some_and(|current| current.ptr_eq(&entry)) {
                entries.remove(&key);
                tracing::debug!(key = %key, "evicted failed navigation cache entry");
            }
        }
        outcome
    }

    /// Drop every entry in the subtree rooted at `path`; with a params
    /// filter, drop only entries at exactly `path` whose parameters match.
    pub fn clear_subtree(&self, path: &[String], params_filter: Option<&Map<String, Value>>) {
        let mut entries = self.entries.lock();
        match params_filter {
            None => entries.retain(|key, _| !key.starts_with(path)),
            Some(params) => {
                let canon = canonical_params(params);
                entries.retain(|key, _| !(key.segments() == path && key.params() == canon));
            }
        }
    }

    /// Drop everything
    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
