//! HTTP server setup and ingress glue.
//!
//! # Responsibilities
//! - Create the Axum app and wire up middleware (tracing, timeout)
//! - Adapt each inbound request into the protocol-agnostic `Request` /
//!   `ResponseHandle` pair and dispatch through the trie router
//! - Await the completion sent by whichever worker thread closes the
//!   response, and translate it back to the wire
//! - Answer `/health` directly, bypassing admission and the pool
//!
//! # Design Decisions
//! - This file is the boundary to the excluded wire transport: the
//!   core never sees Axum types
//! - The transport holds the one strong reference to the response
//!   handle; dropping the request future (client disconnect) marks the
//!   handle closed and releases its scoped resources

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request as AxumRequest, StatusCode};
use axum::response::Response as AxumResponse;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::admission::AdmissionController;
use crate::config::ServiceConfig;
use crate::data_service::{DataServiceAdapter, HttpDataServiceAdapter};
use crate::execution::{JobHandler, JobSink, ShardedPool};
use crate::handler::{ObservableHandler, RequestHandler, ShortenerHandler};
use crate::http::{Request, Response, ResponseHandle};
use crate::observability::{metrics, Telemetry};
use crate::routing::Router;

/// State injected into the ingress handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    max_body_bytes: usize,
}

/// HTTP server for the shortener service.
pub struct HttpServer {
    app: axum::Router,
    pool: Arc<ShardedPool>,
    telemetry: Arc<Telemetry>,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server with the real data service adapter.
    ///
    /// Must be called from within a Tokio runtime (the adapter binds to
    /// it).
    pub fn new(config: ServiceConfig) -> Self {
        let telemetry = Telemetry::init(&config.observability);
        let adapter: Arc<dyn DataServiceAdapter> =
            Arc::new(HttpDataServiceAdapter::new(config.data_service.clone()));
        Self::with_components(config, telemetry, adapter)
    }

    /// Create a server with injected telemetry and adapter. Tests use
    /// this to substitute a mock backend boundary.
    pub fn with_components(
        config: ServiceConfig,
        telemetry: Arc<Telemetry>,
        adapter: Arc<dyn DataServiceAdapter>,
    ) -> Self {
        let shortener = Arc::new(ShortenerHandler::new(adapter, config.codes.length));
        let observable: Arc<dyn JobHandler> = Arc::new(ObservableHandler::new(shortener.clone()));
        let pool = Arc::new(ShardedPool::new(
            config.pool.workers,
            config.pool.queue_capacity,
            observable,
        ));
        let sink_arc: Arc<dyn JobSink> = pool.clone();
        let sink: std::sync::Weak<dyn JobSink> = Arc::downgrade(&sink_arc);
        shortener.bind_response_sink(sink);

        let admission = AdmissionController::new(config.admission.max_in_flight);
        let request_handler =
            Arc::new(RequestHandler::new(pool.clone(), admission, telemetry.clone()))
                .into_route_handler();

        let mut router = Router::new();
        router.post("/shorten", request_handler.clone());
        router.get("/:code", request_handler.clone());
        router.delete("/:code", request_handler.clone());
        router.head("/:code", request_handler);

        let state = AppState {
            router: Arc::new(router),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let app = Self::build_app(&config, state);

        Self {
            app,
            pool,
            telemetry,
            config,
        }
    }

    /// Build the Axum app with all middleware layers.
    fn build_app(config: &ServiceConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .route("/health", get(health_handler))
            .fallback(ingress_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.listener.request_timeout_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        self.pool.start();

        axum::serve(listener, self.app.clone().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.teardown();
        Ok(())
    }

    /// Stop the worker pool and deactivate telemetry.
    fn teardown(&self) {
        self.pool.stop();
        self.telemetry.shutdown();
        tracing::info!("HTTP server stopped");
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Bypasses admission control and the worker pool entirely.
async fn health_handler() -> &'static str {
    "OK"
}

/// Marks the response handle closed when the request future is dropped
/// before completion (client disconnect). Harmless after a normal
/// send: the closed flag already won.
struct DisconnectGuard(Arc<ResponseHandle>);

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.0.mark_closed();
    }
}

/// Adapts one wire request into the core pipeline and back.
async fn ingress_handler(
    State(state): State<AppState>,
    request: AxumRequest<Body>,
) -> AxumResponse {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let mut headers = HashMap::new();
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_string(), value.to_string());
        }
    }

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            metrics::record_request(&method, 400, start);
            return plain_response(StatusCode::BAD_REQUEST, "Bad Request", request_id);
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Dispatching request"
    );

    let core_request = Request::new(method.clone(), &target, headers, body);

    let (tx, rx) = oneshot::channel::<(u16, Vec<(String, String)>, Vec<u8>)>();
    let handle = ResponseHandle::new(Box::new(move |status, headers, body| {
        // The receiver may be gone (peer disconnected); that is a
        // silent drop, not an error.
        let _ = tx.send((status, headers, body));
    }));
    let response = Response::new(&handle);
    let disconnect = DisconnectGuard(handle);

    state.router.dispatch(core_request, response);

    let completion = rx.await;
    drop(disconnect);

    match completion {
        Ok((status, headers, body)) => {
            metrics::record_request(&method, status, start);
            let mut builder = AxumResponse::builder()
                .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
                .header("x-request-id", request_id.to_string());
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder
                .body(Body::from(body))
                .unwrap_or_else(|_| plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", request_id))
        }
        Err(_) => {
            // Every path through a worker either closes the response
            // or drops the handle; a drop without a send means the job
            // was abandoned mid-pipeline.
            tracing::error!(request_id = %request_id, "Response abandoned without completion");
            metrics::record_request(&method, 500, start);
            plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", request_id)
        }
    }
}

fn plain_response(status: StatusCode, body: &'static str, request_id: Uuid) -> AxumResponse {
    let mut response = AxumResponse::new(Body::from(body));
    *response.status_mut() = status;
    if let Ok(value) = request_id.to_string().parse() {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_service::{AdapterCallback, DataServiceRequest};
    use crate::execution::{Job, JobPayload};
    use crate::observability::TraceContext;

    struct NullAdapter;

    impl DataServiceAdapter for NullAdapter {
        fn execute(&self, _request: DataServiceRequest, _callback: AdapterCallback) {}
    }

    #[tokio::test]
    async fn test_teardown_stops_pool_and_telemetry() {
        let config = ServiceConfig::default();
        let telemetry = Telemetry::init(&config.observability);
        let server =
            HttpServer::with_components(config, telemetry.clone(), Arc::new(NullAdapter));

        server.pool.start();
        server.teardown();

        // The pool no longer accepts work and new traces go unsampled.
        assert!(!server.pool.submit(Job {
            session_id: 0,
            trace_ctx: TraceContext::root(false),
            payload: JobPayload::Shutdown,
        }));
        assert!(!telemetry.root_context().is_sampled());
    }
}
