//! Cache Module
//!
//! Provides the single-threaded LRU engine with TTL expiration.

mod expiry;
mod index;
mod listener;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use listener::EvictionListener;
pub use stats::CacheStats;
pub use store::LruCache;
