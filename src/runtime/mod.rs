//! Runtime adapters and API surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_adapter;

pub use api::{health, request_booking, submit_booking, BookingSubmission, Health, OutcomeResponse};
#[cfg(feature = "tokio-runtime")]
pub use tokio_adapter::AsyncBookingEngine;
