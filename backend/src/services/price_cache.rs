use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::models::PriceSeries;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    ticker: String,
    minutes: u32,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: PriceSeries,
    fetched_at: DateTime<Utc>,
}

/// Recently fetched price series keyed by ticker and window.
///
/// Entries are never evicted. A stale entry is simply ignored by `get` and
/// overwritten by the next `put` for the same key, so the map grows with the
/// number of distinct (ticker, window) pairs requested over the process lifetime.
#[derive(Clone)]
pub struct PriceCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: chrono::Duration,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500)),
        }
    }

    /// Cached series for the key if it was fetched less than one TTL ago.
    pub fn get(&self, ticker: &str, minutes: u32) -> Option<PriceSeries> {
        self.get_at(ticker, minutes, Utc::now())
    }

    pub fn get_at(&self, ticker: &str, minutes: u32, now: DateTime<Utc>) -> Option<PriceSeries> {
        let key = CacheKey {
            ticker: ticker.to_string(),
            minutes,
        };
        let entry = self.entries.get(&key)?;
        let age = now - entry.fetched_at;

        if age < self.ttl {
            debug!("Price cache HIT for {} ({} min, age {}ms)", ticker, minutes, age.num_milliseconds());
            Some(entry.series.clone())
        } else {
            debug!("Price cache STALE for {} ({} min, age {}ms)", ticker, minutes, age.num_milliseconds());
            None
        }
    }

    pub fn put(&self, ticker: &str, minutes: u32, series: PriceSeries) {
        self.put_at(ticker, minutes, series, Utc::now());
    }

    pub fn put_at(&self, ticker: &str, minutes: u32, series: PriceSeries, fetched_at: DateTime<Utc>) {
        let key = CacheKey {
            ticker: ticker.to_string(),
            minutes,
        };
        debug!("Price cache PUT for {} ({} min, {} points)", ticker, minutes, series.len());
        self.entries.insert(key, CacheEntry { series, fetched_at });
    }

    /// Number of stored keys, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
