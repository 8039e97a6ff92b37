//! The unit of work flowing through the pool.

use crate::data_service::DataServiceResponse;
use crate::http::{Request, Response};
use crate::observability::TraceContext;

/// One unit of work: a session id, a trace context, and a typed
/// payload. Created at ingress or by an adapter callback, consumed
/// exactly once by the worker that dequeues it.
pub struct Job {
    /// Deterministically selects the worker: `session_id % workers`.
    pub session_id: u64,
    /// Copied by value at every hop; never mutated in place.
    pub trace_ctx: TraceContext,
    pub payload: JobPayload,
}

/// Closed payload union, so dispatch is exhaustive and statically
/// checkable.
pub enum JobPayload {
    /// An inbound HTTP request with its response builder.
    HttpRequest { request: Request, response: Response },
    /// The resolution of an earlier data service call.
    BackendResponse(DataServiceResponse),
    /// Control payload carrying no work; handlers ignore it.
    Shutdown,
}

impl Job {
    /// Payload kind for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self.payload {
            JobPayload::HttpRequest { .. } => "http_request",
            JobPayload::BackendResponse(_) => "backend_response",
            JobPayload::Shutdown => "shutdown",
        }
    }

    /// The response builder tied to this job, if any. Used by the
    /// worker loop for best-effort error replies when a handler
    /// faults.
    pub fn response(&self) -> Option<Response> {
        match &self.payload {
            JobPayload::HttpRequest { response, .. } => Some(response.clone()),
            JobPayload::BackendResponse(r) => Some(r.response.clone()),
            JobPayload::Shutdown => None,
        }
    }
}
