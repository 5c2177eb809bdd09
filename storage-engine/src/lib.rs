//! Response cache storage for the localmart API client.
//!
//! [`ResponseCache`] is the port the client talks to. Two backends plug into it:
//! [`MemoryCache`], an unbounded map with lazy expiry, and [`MokaCache`], a
//! moka-backed store that can additionally bound its capacity.

pub mod memory_cache;
pub mod moka_cache;
pub mod ports;

pub use memory_cache::MemoryCache;
pub use moka_cache::MokaCache;
pub use ports::{CacheEntry, DEFAULT_TTL, ResponseCache};
