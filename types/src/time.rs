//! Timestamp type used throughout the client.
//!
//! Timestamps are Unix epoch seconds (UTC), matching what the ledger stores
//! for filing and incident times.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Whether this timestamp lies strictly after `now`.
    pub fn is_future(&self, now: Timestamp) -> bool {
        self.0 > now.0
    }

    /// Whether `ttl_secs` have fully elapsed since this timestamp.
    pub fn expired_after(&self, ttl_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(ttl_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive_at_the_boundary() {
        let issued = Timestamp::new(100);
        assert!(!issued.expired_after(60, Timestamp::new(159)));
        assert!(issued.expired_after(60, Timestamp::new(160)));
    }

    #[test]
    fn future_check() {
        let now = Timestamp::new(1000);
        assert!(Timestamp::new(1001).is_future(now));
        assert!(!Timestamp::new(1000).is_future(now));
        assert!(!Timestamp::new(999).is_future(now));
    }
}
