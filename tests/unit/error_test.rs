//! Tests for error types

use std::time::Duration;

use prometheus_room_booking::core::{BookingError, Outcome, StoreError};
use prometheus_room_booking::util::serde::RequestId;

#[test]
fn test_booking_error_display() {
    let busy = BookingError::Busy {
        active: 5,
        capacity: 5,
    };
    assert_eq!(busy.to_string(), "system busy: 5 of 5 booking slots in use");

    let invalid = BookingError::InvalidRequest("window [5, 5) is empty".to_string());
    assert!(invalid.to_string().contains("invalid request"));

    let full = BookingError::QueueFull(1_000);
    assert!(full.to_string().contains("1000"));
}

#[test]
fn test_store_error_is_transparent() {
    let err = BookingError::from(StoreError::Backend("disk full".to_string()));
    assert_eq!(err.to_string(), "store backend error: disk full");
}

#[test]
fn test_outcome_maps_back_to_error() {
    let holder = RequestId::new();
    let outcome = Outcome::Conflict {
        resource: "A101".into(),
        holder,
    };
    assert!(!outcome.is_retryable());
    match outcome.into_result() {
        Err(BookingError::Conflict { resource, holder: h }) => {
            assert_eq!(resource.as_str(), "A101");
            assert_eq!(h, holder);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_store_timeout_outcome_is_retryable() {
    let outcome = Outcome::from(BookingError::Store(StoreError::Timeout(Duration::from_secs(10))));
    assert_eq!(outcome.label(), "store_error");
    assert!(outcome.is_retryable());
}

#[test]
fn test_non_outcome_errors_become_invalid() {
    let outcome = Outcome::from(BookingError::NotFound(RequestId::new()));
    assert!(matches!(outcome, Outcome::Invalid(_)));
}

#[test]
fn test_app_result_wraps_booking_error() {
    fn fails() -> prometheus_room_booking::core::AppResult<()> {
        Err(BookingError::Config("admission_capacity must be greater than 0".into()).into())
    }
    let err = fails().unwrap_err();
    assert!(err.to_string().contains("configuration error"));
}
