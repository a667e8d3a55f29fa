//! Cache Module
//!
//! Stale-while-revalidate response cache with single-flight fetches.

mod entry;
mod lookup;
mod pattern;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, Freshness};
pub use lookup::{Lookup, LookupStatus};
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::{KeyInfo, SwrCache};

use tokio::time::Duration;

// == Public Constants ==
/// Freshness window used when the caller does not pass one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Age past which an entry is no longer served, even while revalidating
pub const STALE_WINDOW: Duration = Duration::from_secs(10 * 60);
