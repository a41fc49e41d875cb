//! Audit trail for booking decisions.

use std::collections::VecDeque;

use serde::Serialize;

use crate::core::BookingRequest;
use crate::util::serde::{RequestId, ResourceId};

/// One recorded decision or rejection.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related request.
    pub request_id: RequestId,
    /// Resources the request touched.
    pub resources: Vec<ResourceId>,
    /// Requester identity.
    pub requester: String,
    /// Action taken (enqueue, commit, conflict, busy, lock_timeout, store_error, approve, reject).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards a copy of every event to a shared in-memory buffer, so
/// tests can inspect the trail of an engine that owns its sink.
#[derive(Clone, Default)]
pub struct SharedAuditSink {
    inner: std::sync::Arc<parking_lot::Mutex<Vec<AuditEvent>>>,
}

impl SharedAuditSink {
    /// Create an empty shared sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().clone()
    }

    /// Recorded actions, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<String> {
        self.inner.lock().iter().map(|e| e.action.clone()).collect()
    }
}

impl AuditSink for SharedAuditSink {
    fn record(&mut self, event: AuditEvent) {
        self.inner.lock().push(event);
    }
}

/// Helper to build an audit event for a request.
pub fn build_audit_event(
    request: &BookingRequest,
    action: impl Into<String>,
    detail: Option<String>,
    now_ms: u128,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        request_id: request.id,
        resources: request.resources.clone(),
        requester: request.requester.clone(),
        action: action.into(),
        created_at_ms: now_ms,
        detail,
    }
}
