//! Shared Cache Handle
//!
//! Thread-safe wrapper around [`CacheStore`] that owns the background sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::cache::{CacheStats, CacheStore, Lookup};
use crate::tasks::spawn_cleanup_task;

// == Cache ==
/// A cache shared by all concurrent callers of one interceptor.
///
/// Every operation takes the internal lock for its own duration only, so a
/// `get` racing a `set` on the same key sees either the old or the new value.
/// Hits and misses only take the read lock; a lookup that finds an expired
/// entry retries under the write lock to remove it. Dropping the cache stops
/// its sweep task.
#[derive(Debug)]
pub struct Cache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    sweeper: Option<JoinHandle<()>>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache with the given default TTL.
    ///
    /// A non-zero `cleanup_interval` spawns a sweep task on the current tokio
    /// runtime. With a zero interval expired entries are only dropped when a
    /// lookup finds them.
    pub fn new(default_ttl: Duration, cleanup_interval: Duration) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new(default_ttl)));
        let sweeper = if cleanup_interval.is_zero() {
            None
        } else {
            Some(spawn_cleanup_task(store.clone(), cleanup_interval))
        };

        Self { store, sweeper }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let lookup = self.store.read().await.lookup(key);
        match lookup {
            Lookup::Hit(value) => return Some(value),
            Lookup::Missing => return None,
            Lookup::Expired => {}
        }
        // Re-checked under the write lock: a set may have refreshed the key meanwhile
        self.store.write().await.get(key)
    }

    pub async fn set(&self, key: String, value: V, ttl: Option<Duration>) {
        self.store.write().await.set(key, value, ttl);
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn default_ttl(&self) -> Duration {
        self.store.read().await.default_ttl()
    }

    /// Returns true if a background sweep is running for this cache.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}
