//! Recently submitted URLs

use crate::store::{KeyValueStore, StoreResult};

/// Storage key; the whole list is rewritten on every change
pub const RECENT_URLS_KEY: &str = "sitelens:recentUrls";

pub const MAX_RECENT_URLS: usize = 5;

/// Bounded most-recent-first list of distinct URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentUrlCache {
    urls: Vec<String>,
}

impl RecentUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `url` to the front, dropping the oldest entry past the cap
    pub fn insert(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.urls.retain(|u| *u != url);
        self.urls.insert(0, url);
        self.urls.truncate(MAX_RECENT_URLS);
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }

    /// Load from `store`. A value that doesn't parse counts as empty and is
    /// overwritten by the next save.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let Some(raw) = store.get(RECENT_URLS_KEY)? else {
            return Ok(Self::new());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(stored) => {
                // Oldest first so the stored order wins, then re-apply the
                // invariants in case the value was edited by hand
                let mut cache = Self::new();
                for url in stored.into_iter().rev() {
                    cache.insert(url);
                }
                Ok(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, key = RECENT_URLS_KEY, "Ignoring unreadable recent URLs");
                Ok(Self::new())
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> StoreResult<()> {
        let raw = serde_json::to_string(&self.urls)?;
        store.set(RECENT_URLS_KEY, &raw)
    }
}
