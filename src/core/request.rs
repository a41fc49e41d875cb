//! Booking requests, committed reservations, and submission outcomes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{BookingError, StoreError};
use crate::util::serde::{Priority, RequestId, ResourceId, TimeWindow};

/// Lifecycle state of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting in the backlog.
    Pending,
    /// Reservations were durably written.
    Committed,
    /// Turned down by an approver or by a failed commit.
    Rejected,
}

/// A request to reserve one or more resources for a time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// Resources the request needs simultaneously (usually one).
    pub resources: Vec<ResourceId>,
    /// Requested window.
    pub window: TimeWindow,
    /// Who asked. Opaque to the engine.
    pub requester: String,
    /// Free-form purpose shown to approvers.
    pub purpose: Option<String>,
    /// Base priority before aging.
    pub priority: Priority,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: u128,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// When the request left `Pending`.
    pub decided_at_ms: Option<u128>,
}

impl BookingRequest {
    /// Create a pending request with a fresh id.
    pub fn new(
        requester: impl Into<String>,
        resources: impl IntoIterator<Item = ResourceId>,
        window: TimeWindow,
        priority: Priority,
        created_at_ms: u128,
    ) -> Self {
        Self {
            id: RequestId::new(),
            resources: resources.into_iter().collect(),
            window,
            requester: requester.into(),
            purpose: None,
            priority,
            created_at_ms,
            status: RequestStatus::Pending,
            decided_at_ms: None,
        }
    }

    /// Attach a purpose string.
    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Structural validation shared by `submit` and `enqueue`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for an empty resource set or an
    /// empty window.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.resources.is_empty() {
            return Err(BookingError::InvalidRequest(
                "at least one resource is required".into(),
            ));
        }
        if self.window.is_empty() {
            return Err(BookingError::InvalidRequest(format!(
                "window [{}, {}) is empty",
                self.window.start_ms, self.window.end_ms
            )));
        }
        Ok(())
    }

    pub(crate) fn decide(&mut self, status: RequestStatus, now_ms: u128) {
        self.status = status;
        self.decided_at_ms = Some(now_ms);
    }
}

/// A committed reservation of one resource for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Reserved resource.
    pub resource: ResourceId,
    /// Reserved window.
    pub window: TimeWindow,
    /// Owning request.
    pub request_id: RequestId,
    /// Commit timestamp in milliseconds since epoch.
    pub committed_at_ms: u128,
}

/// A bookable resource. Only `id` matters for arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier.
    pub id: ResourceId,
    /// Human-facing kind, e.g. "Classroom".
    pub kind: String,
    /// Human-facing capacity label, e.g. "60 Students".
    pub capacity: String,
}

impl Resource {
    /// Derive kind and capacity from the id prefix.
    pub fn classify(id: impl Into<ResourceId>) -> Self {
        let id = id.into();
        let raw = id.as_str();
        let (kind, capacity) = if raw.starts_with("Lab") {
            ("Computer Lab", "35 Systems")
        } else if raw.starts_with("Seminar") {
            ("Seminar Hall", "100 People")
        } else if raw.starts_with("LT") {
            ("Lecture Theatre", "80 Students")
        } else if raw.starts_with('A') || raw.starts_with('B') {
            ("Classroom", "60 Students")
        } else {
            ("Room", "Various")
        };
        Self {
            id,
            kind: kind.into(),
            capacity: capacity.into(),
        }
    }
}

/// Result of a single submission.
#[derive(Debug)]
pub enum Outcome {
    /// Every requested reservation was durably written.
    Committed(Vec<ReservationRecord>),
    /// An overlapping reservation already exists; terminal.
    Conflict {
        /// Resource whose schedule overlapped.
        resource: ResourceId,
        /// Request owning the overlapping reservation.
        holder: RequestId,
    },
    /// Admission controller at capacity; retry later.
    Busy {
        /// Attempts in flight at rejection time.
        active: u32,
        /// Configured capacity.
        capacity: u32,
    },
    /// A resource lock was not acquired in time; retryable.
    LockTimeout {
        /// Resource whose lock timed out.
        resource: ResourceId,
        /// How long the caller waited.
        waited: Duration,
    },
    /// Persistence failure; nothing was written.
    StoreError(StoreError),
    /// Malformed request; nothing was acquired.
    Invalid(String),
}

impl Outcome {
    /// True for [`Outcome::Committed`].
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// True for [`Outcome::Conflict`].
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether resubmitting later can change the result.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Busy { .. } | Self::LockTimeout { .. } => true,
            Self::StoreError(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Short label for logs and audit records.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Committed(_) => "commit",
            Self::Conflict { .. } => "conflict",
            Self::Busy { .. } => "busy",
            Self::LockTimeout { .. } => "lock_timeout",
            Self::StoreError(_) => "store_error",
            Self::Invalid(_) => "invalid",
        }
    }

    /// Convert into a `Result` for callers that propagate with `?`.
    ///
    /// # Errors
    ///
    /// Every non-committed outcome maps to its [`BookingError`] counterpart.
    pub fn into_result(self) -> Result<Vec<ReservationRecord>, BookingError> {
        match self {
            Self::Committed(records) => Ok(records),
            Self::Conflict { resource, holder } => Err(BookingError::Conflict { resource, holder }),
            Self::Busy { active, capacity } => Err(BookingError::Busy { active, capacity }),
            Self::LockTimeout { resource, waited } => {
                Err(BookingError::LockTimeout { resource, waited })
            }
            Self::StoreError(e) => Err(BookingError::Store(e)),
            Self::Invalid(reason) => Err(BookingError::InvalidRequest(reason)),
        }
    }
}

impl From<BookingError> for Outcome {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Busy { active, capacity } => Self::Busy { active, capacity },
            BookingError::Conflict { resource, holder } => Self::Conflict { resource, holder },
            BookingError::LockTimeout { resource, waited } => Self::LockTimeout { resource, waited },
            BookingError::Store(e) => Self::StoreError(e),
            other => Self::Invalid(other.to_string()),
        }
    }
}
