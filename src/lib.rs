//! # Prometheus Room Booking
//!
//! A concurrency engine that arbitrates reservations of exclusive, time-bounded
//! resources (rooms) under heavy parallel demand.
//!
//! Many callers submit booking requests at once. The engine guarantees that no
//! two committed reservations on the same resource overlap, bounds how many
//! booking attempts run at the same time, cannot deadlock when one request
//! spans several resources, lets schedule readers proceed without blocking each
//! other, and orders the approval backlog so old low-priority requests are
//! never starved.
//!
//! ## Core Problem Solved
//!
//! - **Double booking**: two requests for the same room and overlapping window
//!   race through availability checks; exactly one may win.
//! - **Overload**: a burst of submissions must not exhaust the store's bounded
//!   connection pool; excess attempts are turned away as `Busy`.
//! - **Deadlock**: requests for `{A101, A102}` and `{A102, A101}` lock in one
//!   canonical order and give back partial lock sets on timeout.
//! - **Starvation**: pending requests gain one priority level per day waited.
//!
//! ## Flow
//!
//! ```text
//! submit ─► admission slot ─► resource locks (sorted) ─► schedule write gate
//!        ─► exclusive store tx { re-check overlaps, insert, commit }
//!        ─► release gate, locks (reverse), slot
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use prometheus_room_booking::config::EngineConfig;
//! use prometheus_room_booking::core::{BookingEngine, BookingRequest};
//! use prometheus_room_booking::infra::store::InMemoryStore;
//! use prometheus_room_booking::util::clock::SystemClock;
//! use prometheus_room_booking::util::serde::{Priority, ResourceId, TimeWindow};
//!
//! let engine = BookingEngine::new(
//!     &EngineConfig::default(),
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(SystemClock),
//! );
//!
//! let nine_to_ten = TimeWindow::new(9 * 3_600_000, 10 * 3_600_000);
//! let first = BookingRequest::new("dr.rao", [ResourceId::from("A101")], nine_to_ten, Priority::Normal, 0);
//! let second = BookingRequest::new("dr.iyer", [ResourceId::from("A101")], nine_to_ten, Priority::High, 0);
//!
//! assert!(engine.submit(&first).is_committed());
//! assert!(engine.submit(&second).is_conflict());
//! ```
//!
//! For complete scenarios, see:
//! - `tests/booking_properties_test.rs` - concurrency properties
//! - `tests/approval_flow_test.rs` - backlog, aging, and approval

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core arbitration: locks, admission, the schedule gate, commit, and aging.
pub mod core;
/// Configuration models for the engine, store backend, and timeouts.
pub mod config;
/// Builders to construct booking engines from configuration.
pub mod builders;
/// Infrastructure adapters for reservation storage backends.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
