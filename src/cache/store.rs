//! Cache Store Module
//!
//! Main cache engine combining the recency list, key index and expiry
//! tracker under one LRU + TTL policy.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

use crate::cache::expiry::{deadline_after, ttl_delta, ExpiryTracker};
use crate::cache::index::KeyIndex;
use crate::cache::lru::{NodeId, RecencyList};
use crate::cache::{CacheStats, EvictionListener};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// How an insert decides the expiry of the entry it writes.
#[derive(Debug, Clone, Copy)]
enum Expiry {
    /// Fresh entries get the default TTL; overwrites keep their record
    Default,
    At(DateTime<Utc>),
    Never,
}

// == LRU Cache ==
/// Fixed-capacity cache with LRU eviction and optional per-entry TTL.
///
/// Expired entries are never returned. They are dropped lazily, when an
/// operation runs into them, or in bulk by [`LruCache::remove_expired`].
///
/// The cache is not thread-safe. Wrap it in a
/// [`SyncLruCache`](crate::SyncLruCache) to share it between threads.
///
/// # Examples
///
/// ```rust
/// use mini_lru::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.add(1, "a");
/// cache.add(2, "b");
/// cache.get(&1);
/// cache.add(3, "c");
///
/// assert_eq!(cache.keys(), vec![&1, &3]);
/// ```
pub struct LruCache<K, V> {
    /// Entries ordered by access time
    list: RecencyList<K, V>,
    /// Key to node lookup
    index: KeyIndex<K>,
    /// Absolute expiries for entries with a TTL
    expiries: ExpiryTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of resident entries
    capacity: usize,
    /// Default TTL, `None` when disabled
    default_ttl: Option<TimeDelta>,
    /// Evict an already expired entry before the LRU tail
    expiry_based_evict: bool,
    on_evict: Option<Box<dyn EvictionListener<K, V>>>,
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("resident", &self.list.len())
            .field("default_ttl", &self.default_ttl)
            .field("expiry_based_evict", &self.expiry_based_evict)
            .field("has_listener", &self.on_evict.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructors ==
    /// Creates a cache holding up to `capacity` entries, without default TTL.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_evict_ttl(capacity, Duration::ZERO, false)
    }

    /// Creates a cache with a default TTL and eviction preference.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be positive
    /// * `default_ttl` - TTL applied to entries added without an explicit
    ///   expiry, `Duration::ZERO` disables it
    /// * `expiry_based_evict` - When over capacity, drop an expired entry
    ///   before falling back to the least recently used one
    pub fn with_evict_ttl(
        capacity: usize,
        default_ttl: Duration,
        expiry_based_evict: bool,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be positive".to_string(),
            ));
        }

        let default_ttl = if default_ttl.is_zero() {
            None
        } else {
            Some(ttl_delta(default_ttl).ok_or_else(|| {
                CacheError::InvalidConfiguration(format!(
                    "default TTL of {:?} is out of range",
                    default_ttl
                ))
            })?)
        };

        Ok(Self {
            list: RecencyList::new(),
            index: KeyIndex::new(),
            expiries: ExpiryTracker::new(),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
            expiry_based_evict,
            on_evict: None,
        })
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_evict_ttl(
            config.max_entries,
            config.default_ttl_duration(),
            config.expiry_based_evict,
        )
    }

    /// Attaches the hook called for every dropped or overwritten entry.
    pub fn with_eviction_listener<L>(mut self, listener: L) -> Self
    where
        L: EvictionListener<K, V> + 'static,
    {
        self.on_evict = Some(Box::new(listener));
        self
    }

    // == Add ==
    /// Adds a value, using the default TTL if one is configured.
    ///
    /// Returns true if the insert pushed another entry out of the cache.
    pub fn add(&mut self, key: K, value: V) -> bool {
        self.put(key, value, Expiry::Default)
    }

    /// Adds a value that expires at `expiry`, or after the default TTL when
    /// `expiry` is `None`.
    ///
    /// Overwriting a live key moves it to the front and hands the old value
    /// to the eviction listener. Its recorded expiry only changes if an
    /// explicit one is given. Nothing is evicted on overwrite.
    ///
    /// Returns true if the insert pushed another entry out of the cache.
    pub fn add_with_expiry(&mut self, key: K, value: V, expiry: Option<DateTime<Utc>>) -> bool {
        let expiry = match expiry {
            Some(at) => Expiry::At(at),
            None => Expiry::Default,
        };
        self.put(key, value, expiry)
    }

    fn put(&mut self, key: K, value: V, expiry: Expiry) -> bool {
        if let Some(id) = self.index.get(&key) {
            if self.expiries.is_expired(&key) {
                // A stale resident is dropped and the key inserted fresh
                self.expire_node(id);
            } else {
                self.list.move_to_front(id);
                if let Some(old) = self.list.replace_value(id, value) {
                    if let Some(listener) = self.on_evict.as_mut() {
                        listener.on_evict(&key, &old);
                    }
                }
                match expiry {
                    Expiry::Default => {}
                    Expiry::At(at) => self.expiries.set(key, at),
                    Expiry::Never => {
                        self.expiries.remove(&key);
                    }
                }
                return false;
            }
        }

        let expires_at = match expiry {
            Expiry::Default => self.default_ttl.and_then(deadline_after),
            Expiry::At(at) => Some(at),
            Expiry::Never => None,
        };

        let id = self.list.push_front(key.clone(), value);
        if let Some(at) = expires_at {
            self.expiries.set(key.clone(), at);
        }
        self.index.insert(key, id);
        debug_assert_eq!(self.list.len(), self.index.len());

        let evict = self.list.len() > self.capacity;
        if evict {
            self.evict_one();
        }
        evict
    }

    // == Get ==
    /// Returns a live value and marks it as most recently used.
    ///
    /// An expired match is removed and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.live_node(key) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();
        self.list.move_to_front(id);
        self.list.value(id)
    }

    // == Contains ==
    /// Checks for a live key without touching recency. Drops an expired match.
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_node(key).is_some()
    }

    // == Peek ==
    /// Returns a live value without touching recency. Drops an expired match.
    pub fn peek<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.live_node(key)?;
        self.list.value(id)
    }

    // == Remove ==
    /// Removes a key whether or not it has expired.
    ///
    /// Returns true only if the removed entry was still live.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.get(key) else {
            return false;
        };
        let present = !self.expiries.is_expired(key);
        self.remove_node(id);
        if !present {
            self.stats.record_expirations(1);
        }
        present
    }

    // == Remove Oldest ==
    /// Evicts one entry using the cache's eviction policy.
    ///
    /// With `expiry_based_evict` the victim may be an expired entry that is
    /// not the LRU tail. Returns `None` only when the cache is empty.
    pub fn remove_oldest(&mut self) -> Option<(K, V)> {
        self.evict_one()
    }

    // == Get Oldest ==
    /// Returns the least recently used live entry without reordering.
    ///
    /// Expired entries at the back of the list are skipped, not removed.
    pub fn get_oldest(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    // == Iteration ==
    /// Iterates live entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list
            .iter_oldest_first()
            .filter(move |(_, key, _)| !self.expiries.is_expired(*key))
            .map(|(_, key, value)| (key, value))
    }

    /// Returns live keys from oldest to newest.
    pub fn keys(&self) -> Vec<&K> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Returns live values from oldest to newest.
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    // == Length ==
    /// Returns the number of live entries. Walks the whole list.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Same as [`LruCache::len`].
    pub fn item_count(&self) -> usize {
        self.len()
    }

    /// Returns the number of resident entries, expired ones included.
    pub fn resident_len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Resize ==
    /// Evicts entries until at most `capacity` remain resident, then adopts
    /// the new capacity.
    ///
    /// Expired residents are swept first and count as expirations, so the
    /// result is the number of live entries evicted.
    pub fn resize(&mut self, capacity: usize) -> usize {
        if self.list.len() > capacity {
            self.remove_expired();
        }

        let mut evicted = 0;
        while self.list.len() > capacity {
            if self.evict_one().is_none() {
                break;
            }
            evicted += 1;
        }
        debug!(
            old_capacity = self.capacity,
            new_capacity = capacity,
            evicted,
            "cache resized"
        );
        self.capacity = capacity;
        evicted
    }

    // == Expiry Queries ==
    /// Checks if a key has a recorded expiry that is already in the past.
    pub fn key_has_expired<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.expiries.is_expired(key)
    }

    /// Returns the expiry of a live key.
    ///
    /// `None` covers an absent key, an expired key and a key without TTL.
    /// Use [`LruCache::contains`] to tell them apart.
    pub fn expiry_for_key<Q>(&self, key: &Q) -> Option<DateTime<Utc>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.expiries.is_expired(key) {
            return None;
        }
        self.expiries.get(key)
    }

    // == Remove Expired ==
    /// Removes every expired entry. Returns how many were removed.
    pub fn remove_expired(&mut self) -> usize {
        let expired: Vec<NodeId> = self
            .list
            .iter_oldest_first()
            .filter(|(_, key, _)| self.expiries.is_expired(*key))
            .map(|(id, _, _)| id)
            .collect();

        for id in &expired {
            self.remove_node(*id);
        }
        self.stats.record_expirations(expired.len());
        debug!(removed = expired.len(), "expired entries swept");
        expired.len()
    }

    // == Change Expiry ==
    /// Sets a new absolute expiry on a live key.
    ///
    /// Fails for absent keys. An expired key is dropped instead and also fails.
    pub fn change_expiry<Q>(&mut self, key: &Q, expiry: DateTime<Utc>) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.live_node(key) else {
            return false;
        };
        match self.list.key(id) {
            Some(stored) => {
                let stored = stored.clone();
                self.expiries.set(stored, expiry);
                true
            }
            None => false,
        }
    }

    // == Move Item ==
    /// Moves a live entry from `src` into `dest`, keeping its absolute expiry.
    ///
    /// The entry is removed from `src` (its listener fires) and then added
    /// to `dest` as two separate steps. Returns the value now held by `dest`,
    /// or `None` if nothing moved: `src` had no live entry for `key`, or
    /// `dest` has zero capacity and could not keep it. A refused move leaves
    /// `src` untouched.
    pub fn move_item<'d, Q>(
        key: &Q,
        dest: &'d mut LruCache<K, V>,
        src: &mut LruCache<K, V>,
    ) -> Option<&'d V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if dest.capacity == 0 {
            return None;
        }
        let (moved_key, value, expires_at) = src.take_live(key)?;
        dest.insert_exact(moved_key, value, expires_at);
        let id = dest.index.get(key)?;
        dest.list.value(id)
    }

    /// Removes a live entry and returns it with its recorded expiry.
    pub(crate) fn take_live<Q>(&mut self, key: &Q) -> Option<(K, V, Option<DateTime<Utc>>)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.live_node(key)?;
        let expires_at = self.expiries.get(key);
        let (key, value) = self.remove_node(id)?;
        Some((key, value, expires_at))
    }

    /// Adds an entry whose expiry is exactly `expires_at`, ignoring the
    /// default TTL.
    pub(crate) fn insert_exact(
        &mut self,
        key: K,
        value: V,
        expires_at: Option<DateTime<Utc>>,
    ) -> bool {
        let expiry = match expires_at {
            Some(at) => Expiry::At(at),
            None => Expiry::Never,
        };
        self.put(key, value, expiry)
    }

    // == Purge ==
    /// Removes every entry, expired ones included, notifying the listener
    /// once for each.
    pub fn purge(&mut self) {
        let drained = self.list.clear();
        self.index.clear();
        self.expiries.clear();

        if let Some(listener) = self.on_evict.as_mut() {
            for (key, value) in &drained {
                listener.on_evict(key, value);
            }
        }
        debug!(removed = drained.len(), "cache purged");
    }

    // == Accessors ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the default TTL, `None` when disabled.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl.and_then(|ttl| ttl.to_std().ok())
    }

    pub fn expiry_based_evict(&self) -> bool {
        self.expiry_based_evict
    }

    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.list.len());
        stats
    }

    // == Internals ==

    /// Resolves a key to its node, dropping it first if it has expired.
    fn live_node<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.get(key)?;
        if self.expiries.is_expired(key) {
            self.expire_node(id);
            return None;
        }
        Some(id)
    }

    /// Picks and removes a victim: an expired entry first when
    /// `expiry_based_evict` is set, the LRU tail otherwise.
    fn evict_one(&mut self) -> Option<(K, V)> {
        let victim = if self.expiry_based_evict {
            self.find_expired().or(self.list.back())
        } else {
            self.list.back()
        };

        let entry = self.remove_node(victim?)?;
        self.stats.record_eviction();
        debug!(
            resident = self.list.len(),
            capacity = self.capacity,
            "evicted cache entry"
        );
        Some(entry)
    }

    /// Finds the oldest entry whose expiry has passed.
    fn find_expired(&self) -> Option<NodeId> {
        self.list
            .iter_oldest_first()
            .find(|(_, key, _)| self.expiries.is_expired(*key))
            .map(|(id, _, _)| id)
    }

    fn expire_node(&mut self, id: NodeId) {
        if self.remove_node(id).is_some() {
            self.stats.record_expirations(1);
            trace!("dropped expired cache entry");
        }
    }

    /// Unlinks a node and clears its index and expiry records.
    fn remove_node(&mut self, id: NodeId) -> Option<(K, V)> {
        let (key, value) = self.list.remove(id)?;
        self.index.remove(&key);
        self.expiries.remove(&key);
        debug_assert_eq!(self.list.len(), self.index.len());
        debug_assert!(self.expiries.len() <= self.index.len());

        if let Some(listener) = self.on_evict.as_mut() {
            listener.on_evict(&key, &value);
        }
        Some((key, value))
    }
}
