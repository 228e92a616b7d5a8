//! In-process cache store

use chrono::Duration;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::store::{CacheEntry, CacheError, CacheStore, CachedData};
use crate::clock::{Clock, SystemClock};

/// Cache store backed by a mutex-guarded map
///
/// Entries live as long as the process. Growth is unbounded; the key space is
/// the set of distinct requests actually made.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry<Value>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn read(&self, key: &str) -> Option<CachedData<Value>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .cloned()
            .map(|entry| entry.into_cached(self.clock.now()))
    }

    fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(value.clone(), self.clock.now(), ttl);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    #[test]
    fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set("k", &json!({"a": 1}), Duration::hours(1)).unwrap();
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_delete_then_get_misses() {
        let cache = MemoryCache::new();
        cache.set("k", &json!("v"), Duration::hours(1)).unwrap();
        cache.delete("k").unwrap();
        assert!(cache.get("k").is_none());
        assert!(cache.delete("k").is_ok());
    }

    #[test]
    fn test_expiry_is_lazy() {
        let clock = Arc::new(ManualClock::default());
        let cache = MemoryCache::with_clock(clock.clone());
        cache.set("k", &json!("v"), Duration::hours(24)).unwrap();

        clock.advance(Duration::hours(24));

        assert!(cache.get("k").is_none());
        // Still stored until overwritten or deleted
        assert_eq!(cache.len(), 1);
        assert!(cache.read("k").unwrap().is_expired);
    }

    #[test]
    fn test_zero_ttl_is_never_served() {
        let cache = MemoryCache::new();
        cache.set("k", &json!("v"), Duration::zero()).unwrap();
        assert!(cache.get("k").is_none());
    }
}
