//! The cache store contract shared by every backend

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors that can occur when writing to or deleting from a cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be serialized
    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A stored value together with its timing metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data
    pub data: T,
    /// When the data was cached
    pub cached_at: DateTime<Utc>,
    /// When the cache entry expires
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: now,
            expires_at: now + ttl,
        }
    }

    /// An entry is valid only if it had a positive TTL and `now` is before its expiry
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > self.cached_at && now < self.expires_at
    }

    pub fn into_cached(self, now: DateTime<Utc>) -> CachedData<T> {
        let is_expired = !self.is_valid_at(now);
        CachedData {
            data: self.data,
            cached_at: self.cached_at,
            is_expired,
        }
    }
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// Whether the cache entry has expired
    pub is_expired: bool,
}

/// Key/value store with per-entry TTL
///
/// Implementations must be atomic per key; no cross-key locking is expected.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Reads an entry whether or not it has expired
    ///
    /// Returns `None` if the entry doesn't exist or cannot be parsed.
    fn read(&self, key: &str) -> Option<CachedData<Value>>;

    /// Stores `value` under `key`, replacing whatever was there
    fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`; removing an absent key succeeds
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Reads a fresh entry; absent and expired are both `None`
    fn get(&self, key: &str) -> Option<Value> {
        self.read(key)
            .filter(|cached| !cached.is_expired)
            .map(|cached| cached.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_valid_before_expiry() {
        let now = Utc::now();
        let entry = CacheEntry::new(1, now, Duration::hours(24));
        assert!(entry.is_valid_at(now));
        assert!(entry.is_valid_at(now + Duration::hours(23)));
    }

    #[test]
    fn test_entry_invalid_at_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry::new(1, now, Duration::hours(24));
        assert!(!entry.is_valid_at(now + Duration::hours(24)));
    }

    #[test]
    fn test_zero_and_negative_ttl_never_valid() {
        let now = Utc::now();
        assert!(!CacheEntry::new(1, now, Duration::zero()).is_valid_at(now));
        assert!(!CacheEntry::new(1, now, Duration::seconds(-5)).is_valid_at(now - Duration::hours(1)));
    }

    #[test]
    fn test_into_cached_marks_expired() {
        let now = Utc::now();
        let cached = CacheEntry::new("x", now, Duration::minutes(1)).into_cached(now + Duration::minutes(2));
        assert!(cached.is_expired);
        assert_eq!(cached.data, "x");
        assert_eq!(cached.cached_at, now);
    }
}
