//! Key Pattern Module
//!
//! Selects groups of keys for bulk invalidation.

use regex::Regex;

use crate::error::{CacheError, Result};

// == Key Pattern ==
/// Matches cache keys for `SwrCache::invalidate_pattern`.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Regular expression tested against the whole key (unanchored)
    Regex(Regex),
    /// Literal prefix
    Prefix(String),
    /// One gateway resource: `/<segment>` followed by end, `/` or `?`
    Resource(String),
}

impl KeyPattern {
    // == Regex ==
    /// Compiles a regular expression source.
    pub fn regex(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(KeyPattern::Regex)
            .map_err(|err| CacheError::InvalidPattern(err.to_string()))
    }

    // == Prefix ==
    pub fn prefix(prefix: impl Into<String>) -> Self {
        KeyPattern::Prefix(prefix.into())
    }

    // == Resource ==
    /// Matches every gateway key under one top-level resource.
    ///
    /// `resource("products")` matches `/products`, `/products/7` and
    /// `/products?page=2` but not `/products-featured`.
    pub fn resource(segment: &str) -> Self {
        KeyPattern::Resource(format!("/{}", segment.trim_matches('/')))
    }

    // == Matches ==
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Regex(regex) => regex.is_match(key),
            KeyPattern::Prefix(prefix) => key.starts_with(prefix.as_str()),
            KeyPattern::Resource(root) => key
                .strip_prefix(root.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?'])),
        }
    }
}

impl From<Regex> for KeyPattern {
    fn from(regex: Regex) -> Self {
        KeyPattern::Regex(regex)
    }
}
