//! Response cache for analysis payloads.
//!
//! The cache is an explicit injected service rather than process-global
//! state: handlers hold an `Arc<dyn AnalysisCache>` and tests can substitute
//! their own backing store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::products::AnalysisResponse;

/// Key→payload store with time-based expiry. A hit returns the stored payload
/// verbatim, so identical requests inside the window serialize byte-identically.
pub trait AnalysisCache: Send + Sync {
    fn get(&self, key: &str) -> Option<AnalysisResponse>;
    fn put(&self, key: &str, response: AnalysisResponse);
}

/// Cache key over the normalized request facets.
#[must_use]
pub fn cache_key(urls: &[String], season: &str, categories: &str) -> String {
    format!("{}|{season}|{categories}", urls.join("|"))
}

/// In-memory [`AnalysisCache`] with lazy expiry-on-read. Expired entries are
/// removed when looked up; nothing evicts entries that are never read again.
pub struct InMemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (AnalysisResponse, Instant)>>,
}

impl InMemoryCache {
    /// Default time-to-live for cached payloads: 30 minutes.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl AnalysisCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<AnalysisResponse> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        match entries.get(key) {
            Some((response, stored_at)) if stored_at.elapsed() < self.ttl => {
                Some(response.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, response: AnalysisResponse) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(key.to_string(), (response, Instant::now()));
    }
}
