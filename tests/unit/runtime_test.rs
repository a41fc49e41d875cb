//! Tests for API models and the async adapter

use std::sync::Arc;

use prometheus_room_booking::config::EngineConfig;
use prometheus_room_booking::core::{BookingEngine, Outcome, StoreError};
use prometheus_room_booking::infra::store::InMemoryStore;
use prometheus_room_booking::runtime::{
    health, request_booking, submit_booking, AsyncBookingEngine, BookingSubmission, OutcomeResponse,
};
use prometheus_room_booking::util::clock::SystemClock;
use prometheus_room_booking::util::serde::{Priority, RequestId, TimeWindow};

fn engine() -> Arc<BookingEngine> {
    Arc::new(BookingEngine::new(
        &EngineConfig::default(),
        Arc::new(InMemoryStore::new()),
        Arc::new(SystemClock),
    ))
}

fn submission(room: &str, start_ms: u128, end_ms: u128) -> BookingSubmission {
    BookingSubmission {
        requester: "dr.rao".to_string(),
        resources: vec![room.into()],
        start_ms,
        end_ms,
        purpose: Some("Compiler design lab".to_string()),
        priority: None,
    }
}

#[test]
fn test_submission_defaults_to_normal_priority() {
    let json = r#"{ "requester": "dr.rao", "resources": ["A101"], "start_ms": 0, "end_ms": 10 }"#;
    let sub: BookingSubmission = serde_json::from_str(json).unwrap();
    let request = sub.into_request(99);
    assert_eq!(request.priority, Priority::Normal);
    assert_eq!(request.created_at_ms, 99);
    assert_eq!(request.window, TimeWindow::new(0, 10));
}

#[test]
fn test_submission_unknown_priority_is_normal() {
    let mut sub = submission("A101", 0, 10);
    sub.priority = Some("asap".to_string());
    assert_eq!(sub.clone().into_request(0).priority, Priority::Normal);
    sub.priority = Some("urgent".to_string());
    assert_eq!(sub.into_request(0).priority, Priority::Urgent);
}

#[test]
fn test_outcome_response_messages() {
    let busy = OutcomeResponse::from(&Outcome::Busy {
        active: 5,
        capacity: 5,
    });
    assert!(!busy.success);
    assert_eq!(busy.status_code, 503);
    assert!(busy.retryable);
    assert!(busy.message.starts_with("System busy"));

    let conflict = OutcomeResponse::from(&Outcome::Conflict {
        resource: "A101".into(),
        holder: RequestId::new(),
    });
    assert_eq!(conflict.status_code, 409);
    assert!(conflict.message.contains("just booked by someone else"));

    let locked = OutcomeResponse::from(&Outcome::StoreError(StoreError::Timeout(
        std::time::Duration::from_secs(10),
    )));
    assert_eq!(locked.message, "Database temporarily locked. Please retry.");
    assert!(locked.retryable);
}

#[test]
fn test_submit_and_request_booking() {
    let engine = engine();
    let committed = submit_booking(&engine, submission("A101", 0, 100), 0);
    assert!(committed.success);
    assert!(committed.message.contains("A101"));
    assert!(committed.request_id.is_some());

    let conflict = submit_booking(&engine, submission("A101", 50, 150), 0);
    assert_eq!(conflict.status_code, 409);

    let queued = request_booking(&engine, submission("A102", 0, 100), 0);
    assert!(queued.success);
    assert_eq!(
        queued.message,
        "Booking request submitted successfully with normal priority"
    );

    let invalid = request_booking(&engine, submission("A102", 100, 100), 0);
    assert_eq!(invalid.status_code, 400);

    let status = health(&engine);
    assert!(status.ok);
    assert_eq!(status.active_bookings, 0);
    assert_eq!(status.pending_requests, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_adapter_round_trip() {
    let adapter = AsyncBookingEngine::new(engine());
    let request = submission("Seminar1", 0, 100).into_request(0);
    let id = adapter.enqueue(request).await.unwrap();

    let pending = adapter.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request.id, id);

    let outcome = adapter.approve(id).await.unwrap();
    assert!(outcome.is_committed());

    let schedule = adapter
        .read_schedule("Seminar1".into(), TimeWindow::new(0, 1_000))
        .await
        .unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].request_id, id);
}
