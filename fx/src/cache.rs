//! Hour-bucketed rate caching.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use crossrate_common::{hour_bucket, now, Timestamp};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rates for one base currency: target code to rate.
pub type RateMap = HashMap<String, Decimal>;

/// Cache key: base currency code plus the wall-clock hour of the fetch.
///
/// Freshness is implicit in the key. A new hour yields a new key and
/// hence a miss, so entries never need an expiry check of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    base: String,
    bucket: DateTime<Utc>,
}

impl BucketKey {
    fn at(base: &str, ts: Timestamp) -> Self {
        Self {
            base: base.to_string(),
            bucket: hour_bucket(ts),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.bucket.format("%Y%m%d%H"))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    rates: RateMap,
    fetched_at: Timestamp,
}

/// Thread-safe cache of fetched rate maps, one line per
/// `(base, hour)` pair.
///
/// Entries are written on miss, read on hit, and dropped only by
/// [`RateCache::clear`] or by aging out of their hour bucket; there is
/// no background sweep.
#[derive(Debug, Default)]
pub struct RateCache {
    entries: DashMap<BucketKey, CacheEntry>,
}

impl RateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Rates cached for the base currency in the current hour.
    pub fn get(&self, base_code: &str) -> Option<RateMap> {
        self.get_at(base_code, now())
    }

    /// Rates cached for the hour containing `ts`.
    pub fn get_at(&self, base_code: &str, ts: Timestamp) -> Option<RateMap> {
        let key = BucketKey::at(base_code, ts);
        match self.entries.get(&key) {
            Some(entry) => {
                debug!(key = %key, "cache hit");
                Some(entry.rates.clone())
            }
            None => {
                debug!(key = %key, "cache miss");
                None
            }
        }
    }

    /// Store rates for the base currency under the current hour bucket.
    pub fn put(&self, base_code: &str, rates: RateMap) {
        self.put_at(base_code, rates, now());
    }

    /// Store rates under the hour bucket containing `ts`.
    pub fn put_at(&self, base_code: &str, rates: RateMap, ts: Timestamp) {
        let key = BucketKey::at(base_code, ts);
        self.entries.insert(
            key,
            CacheEntry {
                rates,
                fetched_at: ts,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cache lines, including aged-out buckets not yet cleared.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observability snapshot: entry count, oldest fetch time and the
    /// sorted list of cache keys.
    pub fn info(&self) -> CacheInfo {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().to_string()).collect();
        keys.sort();

        let oldest_entry = self.entries.iter().map(|e| e.value().fetched_at).min();

        CacheInfo {
            entries: self.entries.len(),
            oldest_entry,
            keys,
        }
    }
}

/// Snapshot of cache state for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    /// Number of cache lines.
    pub entries: usize,
    /// Fetch timestamp of the oldest line, if any.
    pub oldest_entry: Option<Timestamp>,
    /// Sorted cache keys.
    pub keys: Vec<String>,
}
