//! Expiring in-memory cache.
//!
//! Owned by whoever constructs it and handed to the components that need it,
//! so invalidation is an explicit call rather than hidden per-component state.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Key/value cache whose entries expire at an absolute time.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Look up `key` as of `now`. Entries at or past their expiry are misses.
    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    pub fn put(&mut self, key: K, value: V, expires_at: DateTime<Utc>) {
        debug!("Caching {:?} until {}", key, expires_at);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Insert with an expiry relative to now.
    pub fn put_for(&mut self, key: K, value: V, ttl: Duration) {
        self.put(key, value, Utc::now() + ttl);
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type SharedCache<K, V> = Arc<RwLock<TtlCache<K, V>>>;

pub fn shared_cache<K, V>() -> SharedCache<K, V> {
    Arc::new(RwLock::new(TtlCache::default()))
}
