use crate::ports::{DEFAULT_TTL, ResponseCache};
use moka::Expiry;
use moka::sync::Cache;
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Value wrapper that carries the TTL requested at `set` time
#[derive(Clone)]
struct Timed<V> {
    payload: V,
    ttl: Duration,
}

/// Expiry policy that honours each entry's own TTL
struct PerEntryTtl;

impl<V> Expiry<String, Timed<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Timed<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Timed<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based cache implementation with per-entry TTL support
/// Provides a concurrent cache with an optional size bound
pub struct MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<String, Timed<V>>,
    default_ttl: Duration,
}

impl<V> MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new unbounded Moka cache with optional default TTL
    pub fn new_unbounded(default_ttl: Option<Duration>) -> Self {
        Self::new("responses".to_string(), None, default_ttl)
    }

    /// Create a new bounded Moka cache with max entries and optional default TTL
    pub fn new_bounded(max_entries: u64, default_ttl: Option<Duration>) -> Self {
        Self::new("responses".to_string(), Some(max_entries), default_ttl)
    }

    /// Create a Moka cache from name, optional capacity, and optional default TTL
    pub fn new(name: String, max_entries: Option<u64>, default_ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name(&name).expire_after(PerEntryTtl);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            default_ttl: default_ttl.unwrap_or(DEFAULT_TTL),
        }
    }
}

impl<V> ResponseCache<V> for MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        // Either doesn't exist or TTL expired
        self.cache.get(&key.to_string()).map(|timed| timed.payload)
    }

    fn set(&self, key: &str, payload: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.cache.insert(key.to_string(), Timed { payload, ttl });
    }

    fn remove(&self, key: &str) {
        self.cache.invalidate(&key.to_string());
    }

    fn clear(&self) {
        self.cache.invalidate_all();
    }

    fn clear_by_prefix(&self, prefix: &str) {
        let doomed: Vec<_> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();

        for key in &doomed {
            self.cache.invalidate(&**key);
        }

        tracing::debug!(
            "Cleared {} cache entries with prefix '{}'",
            doomed.len(),
            prefix
        );
    }

    fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }
}

impl<V> Debug for MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
