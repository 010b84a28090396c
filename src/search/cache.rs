//! Evidence Cache
//!
//! Time-bounded store of past search results keyed by normalized search text.
//!
//! # Behaviour
//!
//! - An entry written at `t` is a hit for lookups in `[t, t + ttl)` and a miss
//!   from `t + ttl` onward.
//! - Expiry is lazy: a stale entry stays in the map until the next store for
//!   the same key overwrites it. There is no background sweep.
//! - A single `RwLock` guards the map, so concurrent stores for the same key
//!   resolve to exactly one complete entry (last writer wins).
//!
//! # Example
//!
//! ```ignore
//! let cache = EvidenceCache::new(Duration::from_secs(3600));
//! cache.store("remote work benefits", items.clone());
//! assert_eq!(cache.lookup("remote work benefits"), Some(items));
//! ```

use crate::types::ResultItem;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default time-to-live for cached search results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

// ============================================================================
// Cache Entry
// ============================================================================

#[derive(Debug, Clone)]
struct CacheEntry {
    items: Vec<ResultItem>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_valid_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

// ============================================================================
// Cache Statistics
// ============================================================================

/// Counters exposed in the run report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently held, stale ones included
    pub entries: usize,
    /// Entries past their TTL that have not been overwritten yet
    pub expired_entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

// ============================================================================
// Evidence Cache
// ============================================================================

#[derive(Debug)]
pub struct EvidenceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvidenceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Compute the cache key for a normalized search text.
    pub fn compute_key(normalized_text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalized_text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn lookup(&self, normalized_text: &str) -> Option<Vec<ResultItem>> {
        self.lookup_at(normalized_text, Instant::now())
    }

    /// Look up `normalized_text` as if the current time were `now`.
    pub fn lookup_at(&self, normalized_text: &str, now: Instant) -> Option<Vec<ResultItem>> {
        let key = Self::compute_key(normalized_text);
        let entries = self.entries.read();

        match entries.get(&key) {
            Some(entry) if entry.is_valid_at(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.items.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn store(&self, normalized_text: &str, items: Vec<ResultItem>) {
        self.store_at(normalized_text, items, Instant::now());
    }

    /// Store `items` with `now` as the write timestamp. Always overwrites.
    pub fn store_at(&self, normalized_text: &str, items: Vec<ResultItem>, now: Instant) {
        let key = Self::compute_key(normalized_text);
        let entry = CacheEntry {
            items,
            stored_at: now,
        };
        self.entries.write().insert(key, entry);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats_at(Instant::now())
    }

    /// Statistics with expiry judged as of `now`.
    pub fn stats_at(&self, now: Instant) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            expired_entries: entries
                .values()
                .filter(|entry| !entry.is_valid_at(now, self.ttl))
                .count(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for EvidenceCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Tests
// ============================================================================
