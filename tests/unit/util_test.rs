//! Tests for utility functions

use prometheus_room_booking::util::clock::{Clock, ManualClock, MS_PER_HOUR};
use prometheus_room_booking::util::serde::{Priority, RequestId, ResourceId, TimeWindow};

#[test]
fn test_priority_serde_is_lowercase() {
    assert_eq!(serde_json::to_string(&Priority::Urgent).unwrap(), "\"urgent\"");
    let low: Priority = serde_json::from_str("\"low\"").unwrap();
    assert_eq!(low, Priority::Low);
}

#[test]
fn test_priority_labels() {
    assert_eq!(Priority::parse_or_normal("HIGH"), Priority::High);
    assert_eq!(Priority::parse_or_normal("whenever"), Priority::Normal);
    assert!("critical".parse::<Priority>().is_err());
    assert_eq!(Priority::Low.to_string(), "low");
}

#[test]
fn test_time_window_back_to_back() {
    let nine = TimeWindow::new(9 * MS_PER_HOUR, 10 * MS_PER_HOUR);
    let ten = TimeWindow::new(10 * MS_PER_HOUR, 11 * MS_PER_HOUR);
    let half_past_nine = TimeWindow::new(9 * MS_PER_HOUR + MS_PER_HOUR / 2, 10 * MS_PER_HOUR + MS_PER_HOUR / 2);
    assert!(!nine.overlaps(&ten));
    assert!(nine.overlaps(&half_past_nine));
    assert!(half_past_nine.overlaps(&ten));
    assert_eq!(nine.duration_ms(), MS_PER_HOUR);
}

#[test]
fn test_resource_id_serializes_as_string() {
    let id = ResourceId::from("Lab3");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"Lab3\"");
    assert_eq!(id.to_string(), "Lab3");
}

#[test]
fn test_request_ids_unique() {
    assert_ne!(RequestId::new(), RequestId::new());
}

#[test]
fn test_manual_clock_set() {
    let clock = ManualClock::new(0);
    clock.advance_hours(3);
    assert_eq!(clock.now_ms(), 3 * MS_PER_HOUR);
    clock.set_ms(7);
    assert_eq!(clock.now_ms(), 7);
}

#[test]
fn test_init_tracing_is_idempotent() {
    prometheus_room_booking::util::init_tracing();
    prometheus_room_booking::util::init_tracing();
    tracing::info!("tracing initialised twice without panicking");
}
