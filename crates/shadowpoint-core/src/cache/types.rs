//! Cache types and data structures

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Cache entry containing data and its lifetime
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Cached data
    pub data: T,
    /// When the entry was stored
    pub timestamp: DateTime<Utc>,
    /// When the entry stops being served
    pub expiry: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry living for `ttl`
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            data,
            timestamp: now,
            expiry: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiry
    }

    /// Get the age of the entry
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.timestamp
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entry_count: usize,
}

impl CacheStatistics {
    /// Hit ratio in `[0, 1]`; zero before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
