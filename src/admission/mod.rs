//! Admission control (load shedding).
//!
//! # Responsibilities
//! - Bound total in-flight requests with a fast accept/reject check,
//!   performed before any queueing or pool work
//! - Release each admitted slot exactly once, on every exit path
//!
//! # Design Decisions
//! - A single atomic compare-and-increment; the rejection path is O(1)
//!   and lock-free
//! - The guard is attached to the response handle's scoped resources,
//!   so the slot is returned no matter which code path completes the
//!   response (success, error, or client disconnect)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Bounded in-flight request counter.
pub struct AdmissionController {
    in_flight: AtomicUsize,
    max_in_flight: usize,
}

impl AdmissionController {
    pub fn new(max_in_flight: usize) -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: max_in_flight.max(1),
        })
    }

    /// Try to take one concurrency slot. Returns `None` at the
    /// ceiling; the caller must reject the request without queueing it.
    pub fn try_acquire(self: &Arc<Self>) -> Option<AdmissionGuard> {
        self.in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if current < self.max_in_flight {
                    Some(current + 1)
                } else {
                    None
                }
            })
            .ok()
            .map(|_| AdmissionGuard {
                controller: self.clone(),
            })
    }

    pub fn current_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight
    }
}

/// A scoped token for one unit of admitted concurrency. Dropping it
/// returns the slot exactly once.
pub struct AdmissionGuard {
    controller: Arc<AdmissionController>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.controller.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
