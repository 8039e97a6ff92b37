//! Business message handler: the HTTP ↔ backend bridge.
//!
//! # Data Flow
//! ```text
//! http_request job (worker thread)
//!     → derive operation from method + path
//!     → validate / generate the short code
//!     → adapter.execute(.., callback)
//!
//! callback (adapter I/O thread)
//!     → backend_response job, same session id and trace context
//!     → resubmitted through the response sink → same worker
//!
//! backend_response job (same worker)
//!     → map outcome to HTTP status/body
//!     → response.close()
//! ```
//!
//! # Design Decisions
//! - On the happy path the callback only resubmits, so response
//!   writing stays on the session's worker (single writer per session,
//!   end to end); only a refused resubmission closes the exchange
//!   off-worker, with 503
//! - The response sink is a weak reference bound after pool
//!   construction; a dropped pool is treated like a full queue

use std::sync::{OnceLock, Weak};

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::data_service::{
    DataServiceAdapter, DataServiceRequest, DataServiceResponse, DomainError, InfraError,
    Operation,
};
use crate::execution::{Job, JobHandler, JobPayload, JobSink};
use crate::http::{Request, Response};
use crate::observability::TraceContext;

/// Maps inbound HTTP jobs to data service calls and backend-response
/// jobs back to HTTP completions.
pub struct ShortenerHandler {
    adapter: std::sync::Arc<dyn DataServiceAdapter>,
    response_sink: OnceLock<Weak<dyn JobSink>>,
    code_length: usize,
}

impl ShortenerHandler {
    pub fn new(adapter: std::sync::Arc<dyn DataServiceAdapter>, code_length: usize) -> Self {
        Self {
            adapter,
            response_sink: OnceLock::new(),
            code_length: code_length.max(1),
        }
    }

    /// Bind the sink backend-response jobs are resubmitted through.
    /// Called once, after the pool exists; later calls are ignored.
    pub fn bind_response_sink(&self, sink: Weak<dyn JobSink>) {
        let _ = self.response_sink.set(sink);
    }

    fn handle_http(
        &self,
        request: Request,
        mut response: Response,
        session_id: u64,
        trace_ctx: TraceContext,
    ) {
        let derived = match self.derive_request(&request) {
            Ok(d) => d,
            Err((status, message)) => {
                response.set_status(status);
                response.write(message.as_bytes());
                response.close();
                return;
            }
        };

        let Some(sink) = self.response_sink.get().cloned() else {
            tracing::error!("Response sink not bound; cannot dispatch backend call");
            response.set_status(500);
            response.write(b"Internal Server Error");
            response.close();
            return;
        };

        let (operation, entity_id, payload) = derived;
        tracing::debug!(
            operation = operation.name(),
            entity_id = %entity_id,
            session_id,
            "Dispatching data service call"
        );
        let outbound = DataServiceRequest {
            operation,
            entity_id,
            payload,
            response,
            // Crossing the adapter boundary starts a child span.
            trace_ctx: trace_ctx.child(),
        };

        self.adapter.execute(
            outbound,
            Box::new(move |backend_response| {
                let job = Job {
                    session_id,
                    trace_ctx,
                    payload: JobPayload::BackendResponse(backend_response),
                };
                // Kept aside so a refused resubmission can still close
                // the exchange; `submit` consumes the job either way.
                let fallback = job.response();
                let submitted = match sink.upgrade() {
                    Some(sink) => sink.submit(job),
                    None => {
                        tracing::warn!(session_id, "Pool gone; completing off-worker");
                        false
                    }
                };
                if !submitted {
                    tracing::warn!(session_id, "Response job rejected; answering 503");
                    // Closing here is safe off the session's worker:
                    // the handle is exactly-once, and it frees the
                    // admission slot right away.
                    if let Some(mut response) = fallback {
                        response.set_status(503);
                        response.set_header("Retry-After", "1");
                        response.write(b"Service Unavailable");
                        response.close();
                    }
                }
            }),
        );
    }

    fn handle_backend_response(&self, resolution: DataServiceResponse) {
        let DataServiceResponse {
            success,
            http_status,
            domain_error,
            infra_error,
            payload,
            response,
        } = resolution;
        let mut response = response;

        if success {
            response.set_status(http_status);
            if !payload.is_empty() {
                response.set_header("Content-Type", "application/json");
                response.write(&payload);
            }
        } else if let Some(infra) = infra_error {
            let status = match infra {
                InfraError::ConnectionFailed | InfraError::Timeout => 503,
                InfraError::Protocol => 500,
            };
            tracing::warn!(error = %infra, status, "Backend infrastructure failure");
            response.set_status(status);
            response.write(infra.to_string().as_bytes());
        } else {
            let domain = domain_error.unwrap_or(DomainError::Unknown);
            response.set_status(domain.http_status());
            if payload.is_empty() {
                response.write(format!("{:?}", domain).as_bytes());
            } else {
                response.set_header("Content-Type", "application/json");
                response.write(&payload);
            }
        }
        response.close();
    }

    /// Derive (operation, entity id, payload) from the request shape,
    /// or the error status to answer directly.
    fn derive_request(
        &self,
        request: &Request,
    ) -> Result<(Operation, String, Vec<u8>), (u16, &'static str)> {
        if let Some(code) = request.path_param("code") {
            let operation = match request.method() {
                "GET" => Operation::Find,
                "DELETE" => Operation::Delete,
                "HEAD" => Operation::Exists,
                _ => return Err((404, "Not Found")),
            };
            return Ok((operation, code.to_string(), Vec::new()));
        }

        if request.method() == "POST" && request.path() == "/shorten" {
            let url = parse_shorten_body(request.body())
                .ok_or((400, "expected JSON body with a non-empty \"url\" field"))?;
            let code = generate_code(self.code_length);
            let payload = serde_json::json!({ "code": code, "url": url });
            return Ok((
                Operation::Save,
                code,
                serde_json::to_vec(&payload).unwrap_or_default(),
            ));
        }

        Err((404, "Not Found"))
    }
}

impl JobHandler for ShortenerHandler {
    fn handle(&self, job: Job) {
        let Job {
            session_id,
            trace_ctx,
            payload,
        } = job;
        match payload {
            JobPayload::HttpRequest { request, response } => {
                self.handle_http(request, response, session_id, trace_ctx);
            }
            JobPayload::BackendResponse(resolution) => {
                self.handle_backend_response(resolution);
            }
            JobPayload::Shutdown => {}
        }
    }
}

fn parse_shorten_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let url = value.get("url")?.as_str()?;
    if url.is_empty() {
        return None;
    }
    Some(url.to_string())
}

/// Random alphanumeric short code.
fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length).map(|_| rng.sample(Alphanumeric) as char).collect()
}
