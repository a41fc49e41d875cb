//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{BookingEngine, BookingError, BookingRequest, Outcome};
use crate::util::serde::{Priority, RequestId, ResourceId, TimeWindow};

/// Booking submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSubmission {
    /// Who is asking.
    pub requester: String,
    /// Resources needed together.
    pub resources: Vec<ResourceId>,
    /// Window start (ms since epoch).
    pub start_ms: u128,
    /// Window end, exclusive (ms since epoch).
    pub end_ms: u128,
    /// Purpose shown to approvers.
    #[serde(default)]
    pub purpose: Option<String>,
    /// Priority label; missing or unknown labels mean "normal".
    #[serde(default)]
    pub priority: Option<String>,
}

impl BookingSubmission {
    /// Convert into a pending request created at `now_ms`.
    #[must_use]
    pub fn into_request(self, now_ms: u128) -> BookingRequest {
        let priority = self
            .priority
            .as_deref()
            .map_or(Priority::Normal, Priority::parse_or_normal);
        let request = BookingRequest::new(
            self.requester,
            self.resources,
            TimeWindow::new(self.start_ms, self.end_ms),
            priority,
            now_ms,
        );
        match self.purpose {
            Some(purpose) => request.with_purpose(purpose),
            None => request,
        }
    }
}

/// Caller-facing view of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeResponse {
    /// Whether the reservation was made.
    pub success: bool,
    /// HTTP-style status code a handler can forward.
    pub status_code: u16,
    /// Human-readable explanation.
    pub message: String,
    /// Whether resubmitting later may succeed.
    pub retryable: bool,
    /// Request the response is about, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

impl From<&Outcome> for OutcomeResponse {
    fn from(outcome: &Outcome) -> Self {
        let (success, status_code, message) = match outcome {
            Outcome::Committed(records) => {
                let rooms: Vec<&str> = records.iter().map(|r| r.resource.as_str()).collect();
                (true, 200, format!("Booking for {} has been confirmed", rooms.join(", ")))
            }
            Outcome::Conflict { .. } => (
                false,
                409,
                "Room was just booked by someone else. Please refresh and try again.".to_string(),
            ),
            Outcome::Busy { .. } => (
                false,
                503,
                "System busy. Too many concurrent booking requests. Please try again.".to_string(),
            ),
            Outcome::LockTimeout { resource, .. } => (
                false,
                503,
                format!("Room {resource} is being booked by someone else. Please retry."),
            ),
            Outcome::StoreError(e) if e.is_retryable() => (
                false,
                503,
                "Database temporarily locked. Please retry.".to_string(),
            ),
            Outcome::StoreError(_) => (false, 500, "Failed to create booking".to_string()),
            Outcome::Invalid(reason) => (false, 400, reason.clone()),
        };
        Self {
            success,
            status_code,
            message,
            retryable: outcome.is_retryable(),
            request_id: None,
        }
    }
}

impl OutcomeResponse {
    /// Attach the request id.
    #[must_use]
    pub fn for_request(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Booking attempts in flight.
    pub active_bookings: u32,
    /// Requests awaiting approval.
    pub pending_requests: usize,
}

/// Submit a booking directly and describe the result.
pub fn submit_booking(
    engine: &BookingEngine,
    submission: BookingSubmission,
    now_ms: u128,
) -> OutcomeResponse {
    let request = submission.into_request(now_ms);
    let outcome = engine.submit(&request);
    OutcomeResponse::from(&outcome).for_request(request.id)
}

/// Queue a booking for approval and describe the result.
pub fn request_booking(
    engine: &BookingEngine,
    submission: BookingSubmission,
    now_ms: u128,
) -> OutcomeResponse {
    let request = submission.into_request(now_ms);
    let priority = request.priority;
    match engine.enqueue(request) {
        Ok(id) => OutcomeResponse {
            success: true,
            status_code: 200,
            message: format!("Booking request submitted successfully with {priority} priority"),
            retryable: false,
            request_id: Some(id),
        },
        Err(e) => OutcomeResponse {
            success: false,
            status_code: if matches!(e, BookingError::QueueFull(_)) { 503 } else { 400 },
            retryable: false,
            message: e.to_string(),
            request_id: None,
        },
    }
}

/// Return a health payload.
pub fn health(engine: &BookingEngine) -> Health {
    Health {
        ok: true,
        active_bookings: engine.admission().active(),
        pending_requests: engine.pending_len(),
    }
}
