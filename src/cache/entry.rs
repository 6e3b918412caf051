//! Cache Entry Module
//!
//! Defines the structure for individual cache entries: a flat field map
//! with one TTL covering the whole entry.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

// == Hash Entry ==
/// A cached aggregation result: group value -> string-encoded value.
///
/// The TTL applies to the entry as a whole, not per field. Recomputation
/// replaces the full field map and resets the expiry.
#[derive(Debug, Clone)]
pub struct HashEntry {
    /// Field map (group value -> stored string)
    pub fields: HashMap<String, String>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl HashEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` from now.
    ///
    /// The TTL is caller-supplied, so the expiry computation saturates
    /// instead of wrapping: an absurdly large TTL pins the entry to the
    /// far future rather than producing a bogus timestamp.
    pub fn new(fields: HashMap<String, String>, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        Self {
            fields,
            created_at: now,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to the expiration time, so the instant the
    /// TTL has fully elapsed the entry reads as absent.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in whole seconds (0 once expired).
    pub fn ttl_remaining(&self) -> u64 {
        let now = current_timestamp_ms();
        if self.expires_at > now {
            (self.expires_at - now) / 1000
        } else {
            0
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
