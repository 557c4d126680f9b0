//! Thread-Safe Wrapper
//!
//! Serializes every call to an [`LruCache`] through a mutex so one cache
//! can be shared between threads.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::cache::{CacheStats, EvictionListener, LruCache};
use crate::config::Config;
use crate::error::Result;

// == Sync LRU Cache ==
/// An [`LruCache`] behind a [`parking_lot::Mutex`].
///
/// Each method takes the lock once for the whole operation and returns
/// owned data. Eviction listeners run while the lock is held, so a listener
/// must never call back into the same `SyncLruCache`.
#[derive(Debug)]
pub struct SyncLruCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K, V> From<LruCache<K, V>> for SyncLruCache<K, V> {
    fn from(cache: LruCache<K, V>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }
}

impl<K, V> SyncLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Result<Self> {
        LruCache::new(capacity).map(Self::from)
    }

    pub fn with_evict_ttl(
        capacity: usize,
        default_ttl: Duration,
        expiry_based_evict: bool,
    ) -> Result<Self> {
        LruCache::with_evict_ttl(capacity, default_ttl, expiry_based_evict).map(Self::from)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        LruCache::from_config(config).map(Self::from)
    }

    pub fn with_eviction_listener<L>(self, listener: L) -> Self
    where
        L: EvictionListener<K, V> + 'static,
    {
        self.inner.into_inner().with_eviction_listener(listener).into()
    }

    /// Runs `f` with exclusive access to the inner cache.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LruCache<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn add(&self, key: K, value: V) -> bool {
        self.inner.lock().add(key, value)
    }

    pub fn add_with_expiry(&self, key: K, value: V, expiry: Option<DateTime<Utc>>) -> bool {
        self.inner.lock().add_with_expiry(key, value, expiry)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    pub fn remove_oldest(&self) -> Option<(K, V)> {
        self.inner.lock().remove_oldest()
    }

    pub fn get_oldest(&self) -> Option<(K, V)> {
        self.inner
            .lock()
            .get_oldest()
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys().into_iter().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.inner.lock().values().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn item_count(&self) -> usize {
        self.inner.lock().item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn resize(&self, capacity: usize) -> usize {
        self.inner.lock().resize(capacity)
    }

    pub fn key_has_expired<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().key_has_expired(key)
    }

    pub fn expiry_for_key<Q>(&self, key: &Q) -> Option<DateTime<Utc>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().expiry_for_key(key)
    }

    pub fn remove_expired(&self) -> usize {
        self.inner.lock().remove_expired()
    }

    pub fn change_expiry<Q>(&self, key: &Q, expiry: DateTime<Utc>) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().change_expiry(key, expiry)
    }

    // == Move Item ==
    /// Moves a live entry from `src` into `dest`, keeping its absolute expiry.
    ///
    /// The source lock is released before the destination lock is taken,
    /// so concurrent callers observe a removal followed by an insert, not a
    /// single atomic step. Returns the moved value, or `None` if `src` had
    /// no live entry or `dest` has zero capacity.
    pub fn move_item<Q>(key: &Q, dest: &Self, src: &Self) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if dest.capacity() == 0 {
            return None;
        }
        let (moved_key, value, expires_at) = src.inner.lock().take_live(key)?;

        dest.inner
            .lock()
            .insert_exact(moved_key, value.clone(), expires_at);
        Some(value)
    }

    pub fn purge(&self) {
        self.inner.lock().purge()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sync_basic_operations() {
        let cache = SyncLruCache::new(2).unwrap();

        cache.add(1, "a".to_string());
        cache.add(2, "b".to_string());
        assert_eq!(cache.get(&1), Some("a".to_string()));
        assert!(cache.add(3, "c".to_string()));

        assert_eq!(cache.keys(), vec![1, 3]);
        assert_eq!(cache.values(), vec!["a".to_string(), "c".to_string()]);
        assert_eq!(cache.get_oldest(), Some((1, "a".to_string())));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_sync_concurrent_adds_respect_capacity() {
        let cache = Arc::new(SyncLruCache::new(64).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.add(t * 1000 + i, i);
                        cache.get(&(t * 1000 + i / 2));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 64);
        assert_eq!(cache.stats().total_entries, 64);
    }

    #[test]
    fn test_sync_move_item_preserves_expiry() {
        let src = SyncLruCache::new(4).unwrap();
        let dest = SyncLruCache::new(4).unwrap();
        let at = Utc::now() + TimeDelta::seconds(60);
        src.add_with_expiry("k", 7, Some(at));

        assert_eq!(SyncLruCache::move_item("k", &dest, &src), Some(7));
        assert_eq!(dest.expiry_for_key("k"), Some(at));
        assert!(!src.contains("k"));
    }

    #[test]
    fn test_sync_move_item_within_same_cache() {
        let cache = SyncLruCache::new(4).unwrap();
        cache.add(1, "a");

        assert_eq!(SyncLruCache::move_item(&1, &cache, &cache), Some("a"));
        assert!(cache.contains(&1));
    }

    #[test]
    fn test_sync_move_item_into_zero_capacity_is_refused() {
        let src = SyncLruCache::new(4).unwrap();
        let dest = SyncLruCache::new(4).unwrap();
        dest.resize(0);
        src.add(1, "a");

        assert_eq!(SyncLruCache::move_item(&1, &dest, &src), None);
        assert_eq!(src.peek(&1), Some("a"));
        assert_eq!(dest.with_lock(|inner| inner.resident_len()), 0);
    }

    #[test]
    fn test_sync_with_lock_batches() {
        let cache = SyncLruCache::new(8).unwrap();
        let evicted = cache.with_lock(|inner| {
            for i in 0..4 {
                inner.add(i, i);
            }
            inner.resize(2)
        });

        assert_eq!(evicted, 2);
        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.keys(), vec![2, 3]);
    }

    #[test]
    fn test_sync_listener_runs_under_lock() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cache = SyncLruCache::new(1)
            .unwrap()
            .with_eviction_listener(move |k: &u32, _: &u32| sink.lock().push(*k));

        cache.add(1, 1);
        cache.add(2, 2);
        cache.purge();

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert!(cache.is_empty());
    }
}
