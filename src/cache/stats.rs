//! Cache Statistics Module
//!
//! Tracks how lookups were served and how fetches turned out.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups served from a fresh entry
    pub hits: u64,
    /// Lookups served from a stale entry
    pub stale_hits: u64,
    /// Lookups that had to wait for a fetch
    pub misses: u64,
    /// Misses that joined a fetch already in flight
    pub deduplicated: u64,
    /// Background revalidations started
    pub revalidations: u64,
    /// Background revalidations that failed (stale data kept)
    pub revalidation_failures: u64,
    /// Foreground fetches that failed
    pub fetch_failures: u64,
    /// Current number of stored entries
    pub total_entries: usize,
    /// Current number of pending fetches
    pub in_flight: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of lookups answered without waiting on a fetch.
    ///
    /// Returns (hits + stale_hits) / (hits + stale_hits + misses), or 0.0
    /// if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.stale_hits;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_stale_hit(&mut self) {
        self.stale_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_deduplicated(&mut self) {
        self.deduplicated += 1;
    }

    pub fn record_revalidation(&mut self) {
        self.revalidations += 1;
    }

    pub fn record_revalidation_failure(&mut self) {
        self.revalidation_failures += 1;
    }

    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    // == Gauges ==
    /// Updates the entry and in-flight gauges.
    pub fn set_gauges(&mut self, total_entries: usize, in_flight: usize) {
        self.total_entries = total_entries;
        self.in_flight = in_flight;
    }
}
