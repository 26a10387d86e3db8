//! Cache Store Module
//!
//! Single-owner cache engine: HashMap storage with per-entry TTL expiration.
//! Shared access goes through [`crate::cache::Cache`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats};

/// Outcome of a read-only [`CacheStore::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Live entry; counted as a hit
    Hit(V),
    /// No entry; counted as a miss
    Missing,
    /// Entry past its TTL; nothing counted until [`CacheStore::get`] removes it
    Expired,
}

// == Cache Store ==
/// Key-value storage with per-entry expiry.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    stats: StatsRecorder,
    /// TTL for entries stored without an explicit one (zero = never expire)
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new, empty CacheStore.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: StatsRecorder::default(),
            default_ttl,
        }
    }

    /// Returns the TTL applied when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Stores a value under `key`.
    ///
    /// If the key already exists, the value and its expiry are replaced.
    /// A `None` TTL uses the store default.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) {
        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(value, effective_ttl));
    }

    /// Looks up a key without modifying the map.
    ///
    /// Hits and misses are recorded here. An expired entry is reported but
    /// left in place; follow up with [`CacheStore::get`] to remove and count it.
    pub fn lookup(&self, key: &str) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => Lookup::Expired,
            Some(entry) => {
                self.stats.record_hit();
                Lookup::Hit(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                Lookup::Missing
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value only if found and not expired.
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
        }
        self.stats.record_miss();
        None
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let count = before - self.entries.len();
        self.stats.record_expirations(count);
        count
    }

    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const DEFAULT_TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(DEFAULT_TTL);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.default_ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("key1".to_string(), "value1".to_string(), None);
        let value = store.get("key1");

        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: CacheStore<String> = CacheStore::new(DEFAULT_TTL);
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("key1".to_string(), "value1".to_string(), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_overwrite_resets_expiry() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("key1".to_string(), 1, Some(Duration::from_millis(20)));
        store.set("key1".to_string(), 2, Some(Duration::from_secs(60)));

        sleep(Duration::from_millis(30));

        assert_eq!(store.get("key1"), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("key1".to_string(), "value1", Some(Duration::from_millis(20)));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(30));

        // Expired but not yet swept: treated as absent and removed
        assert!(store.get("key1").is_none());
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_default_ttl_applies() {
        let mut store = CacheStore::new(Duration::from_millis(20));

        store.set("key1".to_string(), "value1", None);
        sleep(Duration::from_millis(30));

        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_zero_ttl_never_expires() {
        let mut store = CacheStore::new(Duration::ZERO);

        store.set("key1".to_string(), "value1", None);
        sleep(Duration::from_millis(10));

        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.get("key1"), Some("value1"));
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("key1".to_string(), "value1", None);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_lookup_reports_without_removing() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("live".to_string(), 1, None);
        store.set("stale".to_string(), 2, Some(Duration::from_millis(20)));
        sleep(Duration::from_millis(30));

        assert_eq!(store.lookup("live"), Lookup::Hit(1));
        assert_eq!(store.lookup("absent"), Lookup::Missing);
        assert_eq!(store.lookup("stale"), Lookup::Expired);
        assert_eq!(store.len(), 2);

        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses, stats.expirations), (1, 1, 0));

        // The write path finishes the expired lookup
        assert_eq!(store.get("stale"), None);
        let stats = store.stats();
        assert_eq!((stats.misses, stats.expirations), (2, 1));
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(DEFAULT_TTL);

        store.set("key1".to_string(), "value1", Some(Duration::from_millis(20)));
        store.set("key2".to_string(), "value2", Some(Duration::from_secs(10)));

        sleep(Duration::from_millis(30));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }
}
