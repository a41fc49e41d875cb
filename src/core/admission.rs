//! Admission controller: a fail-fast bound on in-flight booking attempts.
//!
//! The counter is a lock-free `AtomicU32` reserved with a CAS loop, so
//! `try_enter` never parks. A successful entry yields an [`AdmissionPermit`]
//! whose `Drop` gives the slot back, which covers every exit path of the
//! caller (commit, conflict, timeout, store error, panic unwind).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Default number of concurrent booking attempts.
pub const DEFAULT_ADMISSION_CAPACITY: u32 = 5;

/// Bounded concurrency gate for booking attempts.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    capacity: u32,
    active: Arc<AtomicU32>,
}

impl AdmissionController {
    /// Create a controller admitting at most `capacity` attempts at once.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            active: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Attempts currently holding a permit.
    #[must_use]
    pub fn active(&self) -> u32 {
        self.active.load(Ordering::Acquire)
    }

    /// Try to take a slot without waiting. Returns `None` when full.
    #[must_use]
    pub fn try_enter(&self) -> Option<AdmissionPermit> {
        let mut current = self.active.load(Ordering::Acquire);
        loop {
            if current >= self.capacity {
                return None;
            }
            match self.active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(AdmissionPermit {
                        active: Arc::clone(&self.active),
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(DEFAULT_ADMISSION_CAPACITY)
    }
}

/// Scoped admission slot. Dropping it leaves the controller exactly once.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the admission slot"]
pub struct AdmissionPermit {
    active: Arc<AtomicU32>,
}

impl AdmissionPermit {
    fn leave(&self) {
        let previous = self.active.fetch_sub(1, Ordering::Release);
        debug_assert!(previous > 0, "admission counter underflow");
        tracing::trace!("admission slot released, active: {}", previous - 1);
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.leave();
    }
}
