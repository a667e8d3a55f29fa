//! Lookup Result Module
//!
//! Tagged result telling the caller how a value was served.

use serde::Serialize;

// == Lookup ==
/// Value returned by `SwrCache::lookup`, tagged with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Served from an entry younger than the TTL
    Fresh(T),
    /// Served from a stale entry; a background revalidation is pending
    StaleRevalidating(T),
    /// Produced by a fetch this caller started or joined
    Miss(T),
}

/// Payload-free form of [`Lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LookupStatus {
    Fresh,
    Stale,
    Miss,
}

impl LookupStatus {
    /// Value used for the `x-cache` response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStatus::Fresh => "FRESH",
            LookupStatus::Stale => "STALE",
            LookupStatus::Miss => "MISS",
        }
    }
}

impl<T> Lookup<T> {
    pub fn status(&self) -> LookupStatus {
        match self {
            Lookup::Fresh(_) => LookupStatus::Fresh,
            Lookup::StaleRevalidating(_) => LookupStatus::Stale,
            Lookup::Miss(_) => LookupStatus::Miss,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Lookup::Fresh(value) | Lookup::StaleRevalidating(value) | Lookup::Miss(value) => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Lookup::Fresh(value) | Lookup::StaleRevalidating(value) | Lookup::Miss(value) => value,
        }
    }

    /// Splits the lookup into its status and value.
    pub fn into_parts(self) -> (LookupStatus, T) {
        (self.status(), self.into_value())
    }
}
