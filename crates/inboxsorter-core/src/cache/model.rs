//! Cache data models.

use serde::{Deserialize, Serialize};

/// One resolved address pair.
///
/// Serialized with the column names of the `smtp_cache` table so exported
/// files line up with the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Internal directory address (lower-cased).
    #[serde(rename = "ExchangeAddress")]
    pub internal_address: String,
    /// Canonical external address.
    #[serde(rename = "SMTPAddress")]
    pub canonical_address: String,
}

impl CacheEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(internal_address: &str, canonical_address: &str) -> Self {
        Self {
            internal_address: internal_address.to_string(),
            canonical_address: canonical_address.to_string(),
        }
    }
}
