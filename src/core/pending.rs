//! Backlog of requests waiting for approval.
//!
//! Stored unsorted; order is computed on read by the aging scheduler.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::core::{BookingError, BookingRequest, RequestStatus};
use crate::util::serde::RequestId;

/// Default maximum number of pending requests.
pub const DEFAULT_MAX_PENDING: usize = 1_000;

/// Bounded set of pending requests keyed by id.
#[derive(Debug)]
pub struct PendingQueue {
    max_depth: usize,
    requests: Mutex<HashMap<RequestId, BookingRequest>>,
}

impl PendingQueue {
    /// Create a queue holding at most `max_depth` requests.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Add a pending request.
    ///
    /// # Errors
    ///
    /// [`BookingError::QueueFull`] at capacity, [`BookingError::InvalidRequest`]
    /// for a duplicate id or a request that is not `Pending`.
    pub fn push(&self, request: BookingRequest) -> Result<(), BookingError> {
        if request.status != RequestStatus::Pending {
            return Err(BookingError::InvalidRequest(format!(
                "request {} is not pending",
                request.id
            )));
        }
        let mut requests = self.requests.lock();
        if requests.len() >= self.max_depth {
            return Err(BookingError::QueueFull(requests.len()));
        }
        if requests.contains_key(&request.id) {
            return Err(BookingError::InvalidRequest(format!(
                "request {} is already queued",
                request.id
            )));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    /// Put back a request taken for processing. Ignores the depth bound since
    /// the slot was only vacated temporarily.
    pub fn restore(&self, request: BookingRequest) {
        self.requests.lock().insert(request.id, request);
    }

    /// Remove a request for processing.
    pub fn take(&self, id: &RequestId) -> Option<BookingRequest> {
        self.requests.lock().remove(id)
    }

    /// Copy of one request.
    pub fn get(&self, id: &RequestId) -> Option<BookingRequest> {
        self.requests.lock().get(id).cloned()
    }

    /// Copy of every pending request, in no particular order.
    pub fn snapshot(&self) -> Vec<BookingRequest> {
        self.requests.lock().values().cloned().collect()
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    /// Configured bound.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PENDING)
    }
}
