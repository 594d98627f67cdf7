//! Cache strategies

use serde::{Deserialize, Serialize};

/// Which navigation steps get memoized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CacheStrategy {
    /// Never read or write the cache; every call executes fresh
    #[serde(rename = "off")]
    Off,
    /// Cache only the zero-segment root-index fetch
    #[serde(rename = "rootIndexOnly")]
    RootIndexOnly,
    /// Cache every segment
    #[serde(rename = "all")]
    #[default]
    All,
}

impl CacheStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStrategy::Off => "off",
            CacheStrategy::RootIndexOnly => "rootIndexOnly",
            CacheStrategy::All => "all",
        }
    }

    /// Whether a step with the given key participates in the cache
    pub fn caches(&self, key: &crate::CacheKey) -> bool {
        match self {
            CacheStrategy::Off => false,
            CacheStrategy::RootIndexOnly => key.is_root(),
            CacheStrategy::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheKey;
    use serde_json::Map;

    #[test]
    fn test_strategy_caches() {
        let root = CacheKey::root();
        let hop = CacheKey::new(vec!["users".to_string()], &Map::new(), Vec::new());

        assert!(!CacheStrategy::Off.caches(&root));
        assert!(!CacheStrategy::Off.caches(&hop));
        assert!(CacheStrategy::RootIndexOnly.caches(&root));
        assert!(!CacheStrategy::RootIndexOnly.caches(&hop));
        assert!(CacheStrategy::All.caches(&root));
        assert!(CacheStrategy::All.caches(&hop));
    }

    #[test]
    fn test_strategy_serde_names() {
        let s: CacheStrategy = serde_json::from_str("\"rootIndexOnly\"").unwrap();
        assert_eq!(s, CacheStrategy::RootIndexOnly);
        assert_eq!(serde_json::to_string(&CacheStrategy::All).unwrap(), "\"all\"");
    }
}
