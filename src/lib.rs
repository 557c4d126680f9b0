//! Mini LRU - A fixed-capacity in-memory cache
//!
//! Combines least-recently-used capacity eviction with optional per-entry
//! TTL expiry. Expired entries are purged lazily when an operation runs
//! into them.
//!
//! [`LruCache`] is single-threaded. [`SyncLruCache`] wraps it in a mutex
//! for shared use, and with the `cleanup` feature [`spawn_cleanup_task`]
//! sweeps expired entries in the background.

pub mod cache;
pub mod config;
pub mod error;
pub mod sync;
#[cfg(feature = "cleanup")]
pub mod tasks;

pub use cache::{CacheStats, EvictionListener, LruCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use sync::SyncLruCache;
#[cfg(feature = "cleanup")]
pub use tasks::spawn_cleanup_task;
