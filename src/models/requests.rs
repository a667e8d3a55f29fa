//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::KeyPattern;
use crate::error::{CacheError, Result};

/// Request body for POST /cache/invalidate
///
/// Exactly one of the fields must be set.
///
/// # Fields
/// - `key`: a single cache key
/// - `pattern`: a regular expression matched against keys
/// - `prefix`: a literal key prefix
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// What an [`InvalidateRequest`] asks to remove.
#[derive(Debug, Clone)]
pub enum InvalidateTarget {
    Key(String),
    Pattern(KeyPattern),
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let set = [&self.key, &self.pattern, &self.prefix]
            .iter()
            .filter(|field| field.is_some())
            .count();
        if set != 1 {
            return Some("Exactly one of 'key', 'pattern' or 'prefix' is required".to_string());
        }
        if self.key.as_deref() == Some("") {
            return Some("Key cannot be empty".to_string());
        }
        None
    }

    /// Converts the validated request into an invalidation target.
    pub fn into_target(self) -> Result<InvalidateTarget> {
        if let Some(message) = self.validate() {
            return Err(CacheError::InvalidRequest(message));
        }
        match (self.key, self.pattern, self.prefix) {
            (Some(key), _, _) => Ok(InvalidateTarget::Key(key)),
            (_, Some(pattern), _) => KeyPattern::regex(&pattern).map(InvalidateTarget::Pattern),
            (_, _, Some(prefix)) => Ok(InvalidateTarget::Pattern(KeyPattern::prefix(prefix))),
            (None, None, None) => Err(CacheError::InvalidRequest(
                "Nothing to invalidate".to_string(),
            )),
        }
    }
}
