//! Error types for booking operations.

use std::time::Duration;

use thiserror::Error;

use crate::util::serde::{RequestId, ResourceId};

/// Errors produced by the persistent-store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The exclusive transaction could not be opened in time.
    #[error("store transaction timed out after {0:?}")]
    Timeout(Duration),
    /// Backend-specific failure with context.
    #[error("store backend error: {0}")]
    Backend(String),
    /// Underlying file I/O failed.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Only a transaction-begin timeout is worth retrying; everything else is
    /// fatal for the submission that hit it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors produced by booking engine components.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Admission controller at capacity; nothing was acquired.
    #[error("system busy: {active} of {capacity} booking slots in use")]
    Busy {
        /// Attempts in flight when the request was turned away.
        active: u32,
        /// Configured admission capacity.
        capacity: u32,
    },
    /// A committed reservation overlaps the requested window.
    #[error("conflict on resource {resource}: already booked by request {holder}")]
    Conflict {
        /// Resource whose schedule overlapped.
        resource: ResourceId,
        /// Request that owns the overlapping reservation.
        holder: RequestId,
    },
    /// A resource lock was not acquired within the configured bound.
    #[error("timed out after {waited:?} waiting for lock on resource {resource}")]
    LockTimeout {
        /// Resource whose lock could not be taken.
        resource: ResourceId,
        /// How long the caller waited.
        waited: Duration,
    },
    /// Persistence-layer failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The request is malformed (empty resource set, empty window, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The pending backlog is full.
    #[error("pending queue full: {0} requests waiting")]
    QueueFull(usize),
    /// No request with this id is known.
    #[error("request not found: {0}")]
    NotFound(RequestId),
    /// The request already left the pending state.
    #[error("request {0} has already been decided")]
    AlreadyDecided(RequestId),
    /// Configuration rejected while building an engine.
    #[error("configuration error: {0}")]
    Config(String),
    /// The async runtime failed to run a blocking operation.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl BookingError {
    /// Whether retrying the same request later can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Busy { .. } | Self::LockTimeout { .. } => true,
            Self::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
