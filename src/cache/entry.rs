//! Cache Entry Module
//!
//! Defines the stored value for one key along with the time it was fetched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{Duration, Instant};

// == Freshness ==
/// Classification of a stored entry relative to a TTL and the stale window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Age is below the TTL; served without any fetch
    Fresh,
    /// Age is past the TTL but below the stale window; served while revalidating
    Stale,
    /// Age is past the stale window; never served
    Expired,
}

// == Cache Entry ==
/// Represents the last successfully fetched value for a key.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub data: T,
    /// Monotonic time of the last successful fetch or explicit set
    pub fetched_at: Instant,
    /// Wall-clock time of the same event, for diagnostics
    pub fetched_at_utc: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            fetched_at: Instant::now(),
            fetched_at_utc: Utc::now(),
        }
    }

    // == Age ==
    /// Returns how long ago the entry was written.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.fetched_at)
    }

    // == Freshness ==
    /// Classifies the entry.
    ///
    /// The TTL is checked first, so a TTL longer than the stale window keeps
    /// the entry fresh for the whole TTL and expires it right after.
    pub fn freshness(&self, ttl: Duration, stale_window: Duration) -> Freshness {
        let age = self.age();
        if age < ttl {
            Freshness::Fresh
        } else if age < stale_window {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }
}
