//! Clock seam for credential-expiry decisions.

use fir_types::Timestamp;

/// Source of "now" for the session layer.
///
/// Production code uses [`SystemClock`]; tests swap in the nullable clock so
/// token expiry is deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
