use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;

/// TTL applied when `set` is called without one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// Ports are the pluggable extension points for underlying cache implementations

/// Port for response cache operations.
///
/// None of these operations can fail: a missing or expired key reads as `None`.
pub trait ResponseCache<V>: Send + Sync + Debug + 'static {
    /// Return the payload stored under `key` if it has not expired.
    /// An expired entry is discarded as a side effect.
    fn get(&self, key: &str) -> Option<V>;

    /// Store or overwrite `key`. `None` uses the cache's default TTL.
    fn set(&self, key: &str, payload: V, ttl: Option<Duration>);

    /// Remove `key` if present
    fn remove(&self, key: &str);

    /// Remove every entry
    fn clear(&self);

    /// Remove every entry whose key starts with `prefix` (literal string match).
    ///
    /// A write to `/products/5` does not reach a list cached under
    /// `/products?shop_id=1`; callers that need that must purge it themselves.
    fn clear_by_prefix(&self, prefix: &str);

    /// Number of stored entries, including ones that expired but were not yet purged
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A stored payload together with its expiry bookkeeping
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub key: String,
    pub payload: V,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(key: impl Into<String>, payload: V, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            payload,
            stored_at: Instant::now(),
            ttl,
        }
    }

    /// An entry is fresh while `now < stored_at + ttl`
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        match self.stored_at.checked_add(self.ttl) {
            Some(deadline) => now < deadline,
            // deadline past the clock's range never arrives
            None => true,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }
}
