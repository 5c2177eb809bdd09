use crate::ports::{CacheEntry, DEFAULT_TTL, ResponseCache};
use dashmap::DashMap;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;

/// Unbounded in-memory cache with per-entry TTL.
///
/// Expired entries stay in the map until the next `get` on their key or a purge.
/// Two callers that both miss on the same key may both fetch and both `set`;
/// the last write wins.
pub struct MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }
}

impl<V> Default for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResponseCache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();

        // the shard guard must be released before removing
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh_at(now) => return Some(entry.payload.clone()),
            Some(_) => {}
            None => return None,
        }

        // Lazy purge; re-check so a concurrent fresh `set` survives
        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_fresh_at(now))
            .is_some()
        {
            tracing::debug!("Purged expired cache entry '{}'", key);
        }
        None
    }

    fn set(&self, key: &str, payload: V, ttl: Option<Duration>) {
        let entry = CacheEntry::new(key, payload, ttl.unwrap_or(self.default_ttl));
        self.entries.insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn clear_by_prefix(&self, prefix: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        tracing::debug!(
            "Cleared {} cache entries with prefix '{}'",
            before.saturating_sub(self.entries.len()),
            prefix
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<V> Debug for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.entries.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
