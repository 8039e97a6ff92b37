//! Ingress request handler: admission, session binding, pool handoff.
//!
//! # Responsibilities
//! - Build the trace context for the inbound request
//! - Run the admission check before any queueing, answering 503 +
//!   `Retry-After` on rejection
//! - Derive the session id, wrap the exchange into a job, and submit
//!   it to the worker pool
//! - Convert a full worker queue into 503, releasing the admission
//!   slot that was just taken
//!
//! # Design Decisions
//! - The admission guard rides on the response handle's scoped
//!   resources; whichever path completes the response returns the slot
//! - Session ids hash the short code when present so every operation
//!   on one code serializes on one worker; codeless requests get a
//!   fresh sequence value

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::admission::AdmissionController;
use crate::execution::{Job, JobPayload, ShardedPool};
use crate::http::{Request, Response};
use crate::observability::{metrics, Telemetry};
use crate::routing::Handler;

/// Bridges matched routes into the worker pool.
pub struct RequestHandler {
    pool: Arc<ShardedPool>,
    admission: Arc<AdmissionController>,
    telemetry: Arc<Telemetry>,
    session_seq: AtomicU64,
}

impl RequestHandler {
    pub fn new(
        pool: Arc<ShardedPool>,
        admission: Arc<AdmissionController>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            pool,
            admission,
            telemetry,
            session_seq: AtomicU64::new(0),
        }
    }

    /// Wrap into the router's handler shape.
    pub fn into_route_handler(self: Arc<Self>) -> Handler {
        Arc::new(move |request, response| self.handle(request, response))
    }

    pub fn handle(&self, request: Request, response: Response) {
        let trace_ctx = self.telemetry.context_for(request.header("traceparent"));

        let Some(guard) = self.admission.try_acquire() else {
            tracing::warn!(
                current = self.admission.current_count(),
                max = self.admission.max_concurrent(),
                "Load shedder rejected request"
            );
            metrics::record_shed();
            shed(response);
            return;
        };
        response.attach_resource(Box::new(guard));

        let session_id = self.session_id(&request);
        // Kept aside for the rejection path; the job owns the original.
        let fallback = response.clone();
        let job = Job {
            session_id,
            trace_ctx,
            payload: JobPayload::HttpRequest { request, response },
        };

        if !self.pool.submit(job) {
            tracing::warn!(
                session_id,
                worker = self.pool.worker_index(session_id),
                "Worker queue full; shedding request"
            );
            metrics::record_queue_full();
            // Closing releases the admission slot through the handle's
            // scoped resources.
            shed(fallback);
        }
    }

    fn session_id(&self, request: &Request) -> u64 {
        match request.path_param("code") {
            Some(code) => {
                let mut hasher = DefaultHasher::new();
                code.hash(&mut hasher);
                hasher.finish()
            }
            None => self.session_seq.fetch_add(1, Ordering::Relaxed),
        }
    }
}

fn shed(mut response: Response) {
    response.set_status(503);
    response.set_header("Retry-After", "1");
    response.write(b"Service Unavailable");
    response.close();
}
