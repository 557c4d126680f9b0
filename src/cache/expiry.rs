//! Expiry Tracker Module
//!
//! Records absolute expiry instants for entries that have a TTL.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

// == Expiry Tracker ==
/// Map from key to the wall-clock instant after which the entry is stale.
///
/// A key with no record never expires.
#[derive(Debug)]
pub struct ExpiryTracker<K> {
    expiries: HashMap<K, DateTime<Utc>>,
}

impl<K> Default for ExpiryTracker<K> {
    fn default() -> Self {
        Self {
            expiries: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> ExpiryTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<DateTime<Utc>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.expiries.get(key).copied()
    }

    pub fn set(&mut self, key: K, expires_at: DateTime<Utc>) {
        self.expiries.insert(key, expires_at);
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<DateTime<Utc>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.expiries.remove(key)
    }

    // == Is Expired ==
    /// Checks if the key has a recorded expiry strictly before the current time.
    ///
    /// The clock is read on every call.
    pub fn is_expired<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.expiries
            .get(key)
            .is_some_and(|expires_at| *expires_at < Utc::now())
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

// == Deadline ==
/// Returns `now + ttl`, or `None` when the sum cannot be represented.
pub fn deadline_after(ttl: TimeDelta) -> Option<DateTime<Utc>> {
    Utc::now().checked_add_signed(ttl)
}

/// Converts a TTL into the signed delta used for deadlines.
pub fn ttl_delta(ttl: Duration) -> Option<TimeDelta> {
    TimeDelta::from_std(ttl).ok()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_no_record_never_expires() {
        let tracker: ExpiryTracker<String> = ExpiryTracker::new();
        assert!(!tracker.is_expired("missing"));
        assert!(tracker.get("missing").is_none());
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let mut tracker = ExpiryTracker::new();
        tracker.set("key".to_string(), Utc::now() - TimeDelta::seconds(1));
        assert!(tracker.is_expired("key"));
    }

    #[test]
    fn test_future_expiry_is_not_expired() {
        let mut tracker = ExpiryTracker::new();
        tracker.set("key".to_string(), Utc::now() + TimeDelta::seconds(60));
        assert!(!tracker.is_expired("key"));
    }

    #[test]
    fn test_expiration_after_ttl() {
        let mut tracker = ExpiryTracker::new();
        let deadline = deadline_after(TimeDelta::milliseconds(20)).unwrap();
        tracker.set("key".to_string(), deadline);

        assert!(!tracker.is_expired("key"));
        sleep(Duration::from_millis(50));
        assert!(tracker.is_expired("key"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut tracker = ExpiryTracker::new();
        let at = Utc::now();
        tracker.set("a".to_string(), at);
        tracker.set("b".to_string(), at);

        assert_eq!(tracker.remove("a"), Some(at));
        assert_eq!(tracker.len(), 1);
        tracker.clear();
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn test_ttl_delta_out_of_range() {
        assert_eq!(ttl_delta(Duration::from_secs(5)), Some(TimeDelta::seconds(5)));
        assert!(ttl_delta(Duration::MAX).is_none());
    }
}
