//! HTTP implementation of the data service adapter.
//!
//! # Responsibilities
//! - Translate operation → verb and base path + entity id → request path
//! - Race every call against the configured deadline; the callback
//!   fires exactly once either way
//! - Re-emit the trace context as a `traceparent` header
//!
//! # Design Decisions
//! - `execute` is callable from any (non-async) worker thread; the
//!   I/O runs on the Tokio runtime captured at construction
//! - Infrastructure failures (connect, timeout, protocol) never reach
//!   the domain-error table

use std::time::Duration;

use axum::body::Body;
use axum::http::Request as HttpRequest;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::DataServiceConfig;
use crate::data_service::{
    AdapterCallback, DataServiceAdapter, DataServiceRequest, DataServiceResponse, DomainError,
    InfraError, Operation,
};
use crate::observability::metrics;

/// Maximum backend response body buffered into a response payload.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Adapter that talks to a REST data service over HTTP.
pub struct HttpDataServiceAdapter {
    client: Client<HttpConnector, Body>,
    config: DataServiceConfig,
    runtime: tokio::runtime::Handle,
}

impl HttpDataServiceAdapter {
    /// Create an adapter bound to the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new(config: DataServiceConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            config,
            runtime: tokio::runtime::Handle::current(),
        }
    }
}

impl DataServiceAdapter for HttpDataServiceAdapter {
    fn execute(&self, request: DataServiceRequest, callback: AdapterCallback) {
        let operation = request.operation;
        let path = build_path(&self.config.base_path, operation, &request.entity_id);
        let uri = format!("http://{}{}", self.config.address, path);

        let DataServiceRequest {
            payload,
            response,
            trace_ctx,
            ..
        } = request;

        let outbound = HttpRequest::builder()
            .method(operation.http_method())
            .uri(&uri)
            .header("content-type", "application/json")
            .header("traceparent", trace_ctx.to_traceparent())
            .body(Body::from(payload));

        let outbound = match outbound {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "Failed to build backend request");
                metrics::record_backend_call(operation.name(), "protocol_error");
                callback(infra_failure(response, InfraError::Protocol));
                return;
            }
        };

        let client = self.client.clone();
        let deadline = Duration::from_millis(self.config.timeout_ms);

        self.runtime.spawn(async move {
            let outcome = match tokio::time::timeout(deadline, client.request(outbound)).await {
                Err(_) => {
                    tracing::warn!(
                        operation = operation.name(),
                        timeout_ms = deadline.as_millis() as u64,
                        "Backend call timed out"
                    );
                    metrics::record_backend_call(operation.name(), "timeout");
                    infra_failure(response, InfraError::Timeout)
                }
                Ok(Err(e)) => {
                    let infra = if e.is_connect() {
                        InfraError::ConnectionFailed
                    } else {
                        InfraError::Protocol
                    };
                    tracing::warn!(operation = operation.name(), error = %e, "Backend call failed");
                    metrics::record_backend_call(operation.name(), "infra_error");
                    infra_failure(response, infra)
                }
                Ok(Ok(resp)) => {
                    let status = resp.status().as_u16();
                    let body =
                        axum::body::to_bytes(Body::new(resp.into_body()), MAX_RESPONSE_BYTES)
                            .await;
                    match body {
                        Ok(bytes) => {
                            let success = (200..300).contains(&status);
                            metrics::record_backend_call(
                                operation.name(),
                                if success { "ok" } else { "domain_error" },
                            );
                            DataServiceResponse {
                                success,
                                http_status: status,
                                domain_error: if success {
                                    None
                                } else {
                                    Some(DomainError::from_status(status))
                                },
                                infra_error: None,
                                payload: bytes.to_vec(),
                                response,
                            }
                        }
                        Err(e) => {
                            tracing::warn!(operation = operation.name(), error = %e, "Backend body read failed");
                            metrics::record_backend_call(operation.name(), "protocol_error");
                            infra_failure(response, InfraError::Protocol)
                        }
                    }
                }
            };

            callback(outcome);
        });
    }
}

fn infra_failure(response: crate::http::Response, error: InfraError) -> DataServiceResponse {
    DataServiceResponse {
        success: false,
        http_status: 0,
        domain_error: None,
        infra_error: Some(error),
        payload: Vec::new(),
        response,
    }
}

/// Id-scoped operations append the entity id to the base path; `Save`
/// posts to the collection itself.
fn build_path(base_path: &str, operation: Operation, entity_id: &str) -> String {
    match operation {
        Operation::Save => base_path.to_string(),
        Operation::Find | Operation::Delete | Operation::Exists => {
            format!("{}/{}", base_path, entity_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path() {
        assert_eq!(build_path("/api/v1/links", Operation::Save, "abc"), "/api/v1/links");
        assert_eq!(
            build_path("/api/v1/links", Operation::Find, "abc"),
            "/api/v1/links/abc"
        );
        assert_eq!(
            build_path("/api/v1/links", Operation::Delete, "abc"),
            "/api/v1/links/abc"
        );
        assert_eq!(
            build_path("/api/v1/links", Operation::Exists, "abc"),
            "/api/v1/links/abc"
        );
    }
}
