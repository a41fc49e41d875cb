//! Time sources.
//!
//! All timestamps in the crate are milliseconds since the Unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: u128 = 3_600_000;

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Source of the current time, injected so aging and archival are testable.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u128;
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u128 {
        now_ms()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<u128>,
}

impl ManualClock {
    /// Create a clock frozen at `start_ms`.
    #[must_use]
    pub const fn new(start_ms: u128) -> Self {
        Self {
            now: Mutex::new(start_ms),
        }
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: u128) {
        *self.now.lock() += delta_ms;
    }

    /// Move the clock forward by whole hours.
    pub fn advance_hours(&self, hours: u128) {
        self.advance_ms(hours * MS_PER_HOUR);
    }

    /// Jump to an absolute time.
    pub fn set_ms(&self, now_ms: u128) {
        *self.now.lock() = now_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u128 {
        *self.now.lock()
    }
}
