//! In-memory response cache with per-entry TTL.
//!
//! Entries are keyed by a deterministic request signature and expire
//! individually. Eviction is lazy: an expired entry is removed by the next
//! lookup that finds it, there is no background sweep. The cache is
//! in-memory only and resets on application restart.
//!
//! No maximum size is enforced. TTLs are minutes, not hours, so unbounded
//! growth over a long-lived process is an accepted tradeoff.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde_json::Value;

/// A single cached response.
#[derive(Debug)]
struct CacheEntry {
    /// The deserialized response payload.
    value: Value,
    /// When the entry was stored.
    inserted_at: Instant,
    /// How long the entry stays valid after insertion.
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// In-memory cache for provider responses.
///
/// Thread-safe; lookups and stores take a single short lock with no
/// await points inside the critical section.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the entry map, recovering from poison if necessary.
    ///
    /// For a cache, recovering from a poisoned mutex is safe: the worst
    /// case is a stale or missing entry, which is better than panicking.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Response cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Look up a cached value.
    ///
    /// An entry that has reached its TTL behaves as a miss and is removed.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock_entries();

        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                debug!("Cache: entry '{}' expired, evicting", key);
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store a value under the given key.
    ///
    /// A zero TTL disables caching: the key is invalidated instead of
    /// stored, so a class with caching turned off never serves stale data.
    pub fn put(&self, key: &str, value: Value, ttl: Duration) {
        if ttl.is_zero() {
            self.invalidate(key);
            return;
        }

        let mut entries = self.lock_entries();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Remove a key from the cache.
    pub fn invalidate(&self, key: &str) {
        let mut entries = self.lock_entries();
        entries.remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.lock_entries();
        entries.clear();
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Backdate an entry so it reads as expired without sleeping.
    fn backdate(cache: &ResponseCache, key: &str, by: Duration) {
        let mut entries = cache.lock_entries();
        if let Some(entry) = entries.get_mut(key) {
            entry.inserted_at = Instant::now() - by;
        }
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let cache = ResponseCache::new();
        let value = json!({"id": "123", "displayName": "Ada Lovelace"});

        cache.put("employees:123", value.clone(), Duration::from_secs(300));

        assert_eq!(cache.get("employees:123"), Some(value));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = ResponseCache::new();
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_expired_entry_behaves_as_miss_and_is_evicted() {
        let cache = ResponseCache::new();
        cache.put("k", json!(1), Duration::from_secs(10));

        backdate(&cache, "k", Duration::from_secs(10));

        assert_eq!(cache.get("k"), None);
        // Lazy eviction removed the entry.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_after_expiry_succeeds() {
        let cache = ResponseCache::new();
        cache.put("k", json!("old"), Duration::from_secs(10));
        backdate(&cache, "k", Duration::from_secs(11));
        assert_eq!(cache.get("k"), None);

        cache.put("k", json!("new"), Duration::from_secs(10));
        assert_eq!(cache.get("k"), Some(json!("new")));
    }

    #[test]
    fn test_zero_ttl_disables_storage() {
        let cache = ResponseCache::new();
        cache.put("k", json!("kept"), Duration::from_secs(60));

        // A zero-TTL put acts as an invalidation.
        cache.put("k", json!("dropped"), Duration::ZERO);

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = ResponseCache::new();
        cache.put("k", json!(true), Duration::from_secs(60));

        cache.invalidate("k");

        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_clear_removes_all_entries() {
        let cache = ResponseCache::new();
        cache.put("a", json!(1), Duration::from_secs(60));
        cache.put("b", json!(2), Duration::from_secs(60));

        cache.clear();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_expire_independently() {
        let cache = ResponseCache::new();
        cache.put("short", json!(1), Duration::from_secs(5));
        cache.put("long", json!(2), Duration::from_secs(3600));

        backdate(&cache, "short", Duration::from_secs(6));
        backdate(&cache, "long", Duration::from_secs(6));

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some(json!(2)));
    }
}
