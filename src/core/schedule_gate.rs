//! Writer-preferring read/write gate over the aggregate schedule view.
//!
//! Readers share the gate; a commit takes it exclusively. Once a writer is
//! waiting, new readers are held back until every pending writer has run, so a
//! steady stream of schedule listings cannot starve commits.
//!
//! The gate is built from a `parking_lot::Mutex` plus two `Condvar`s rather
//! than `parking_lot::RwLock` so the preference policy is explicit in code.
//!
//! # Examples
//!
//! ```
//! use prometheus_room_booking::core::ScheduleGate;
//!
//! let gate = ScheduleGate::new();
//! {
//!     let _a = gate.acquire_read();
//!     let _b = gate.acquire_read();
//!     assert_eq!(gate.snapshot().readers, 2);
//! }
//! let _w = gate.acquire_write();
//! assert!(gate.snapshot().writer_active);
//! ```

use parking_lot::{Condvar, Mutex};

/// Counters protected by the gate's internal mutex.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    /// Readers currently inside.
    pub readers: usize,
    /// Whether a writer is inside.
    pub writer_active: bool,
    /// Writers parked waiting for the gate.
    pub writers_waiting: usize,
}

impl GateState {
    const fn admits_reader(&self) -> bool {
        !self.writer_active && self.writers_waiting == 0
    }

    const fn admits_writer(&self) -> bool {
        !self.writer_active && self.readers == 0
    }
}

/// Reader-writer arbiter with writer preference.
#[derive(Debug, Default)]
pub struct ScheduleGate {
    state: Mutex<GateState>,
    readers_cv: Condvar,
    writers_cv: Condvar,
}

impl ScheduleGate {
    /// Create an idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter as a reader, blocking while a writer is active or pending.
    pub fn acquire_read(&self) -> ReadTicket<'_> {
        let mut state = self.state.lock();
        self.readers_cv.wait_while(&mut state, |s| !s.admits_reader());
        state.readers += 1;
        ReadTicket { gate: self }
    }

    /// Enter as a reader only if that would not block.
    pub fn try_acquire_read(&self) -> Option<ReadTicket<'_>> {
        let mut state = self.state.lock();
        if !state.admits_reader() {
            return None;
        }
        state.readers += 1;
        Some(ReadTicket { gate: self })
    }

    /// Enter as the single writer, blocking until readers drain and no other
    /// writer is inside. Registers as pending first so new readers queue up
    /// behind this writer.
    pub fn acquire_write(&self) -> WriteTicket<'_> {
        let mut state = self.state.lock();
        state.writers_waiting += 1;
        self.writers_cv.wait_while(&mut state, |s| !s.admits_writer());
        state.writers_waiting -= 1;
        state.writer_active = true;
        WriteTicket { gate: self }
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> GateState {
        *self.state.lock()
    }

    fn release_read(&self) {
        let mut state = self.state.lock();
        state.readers -= 1;
        if state.readers == 0 && state.writers_waiting > 0 {
            self.writers_cv.notify_one();
        }
    }

    fn release_write(&self) {
        let mut state = self.state.lock();
        state.writer_active = false;
        if state.writers_waiting > 0 {
            self.writers_cv.notify_one();
        } else {
            self.readers_cv.notify_all();
        }
    }
}

/// Shared hold on the gate; released on drop.
#[derive(Debug)]
#[must_use = "dropping the ticket immediately releases the read hold"]
pub struct ReadTicket<'a> {
    gate: &'a ScheduleGate,
}

impl Drop for ReadTicket<'_> {
    fn drop(&mut self) {
        self.gate.release_read();
    }
}

/// Exclusive hold on the gate; released on drop.
#[derive(Debug)]
#[must_use = "dropping the ticket immediately releases the write hold"]
pub struct WriteTicket<'a> {
    gate: &'a ScheduleGate,
}

impl Drop for WriteTicket<'_> {
    fn drop(&mut self) {
        self.gate.release_write();
    }
}
