//! Telemetry lifecycle and context creation.
//!
//! # Responsibilities
//! - Own the process-wide telemetry state with an explicit
//!   `init`/`shutdown` lifecycle
//! - Create root contexts (with the configured sampling decision) and
//!   ingest incoming `traceparent` headers
//!
//! # Design Decisions
//! - Injected into components as `Arc<Telemetry>` rather than accessed
//!   through a global, so tests can substitute a disabled instance
//! - Sampling is decided once at the root; children inherit the flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;

use crate::config::ObservabilityConfig;
use crate::observability::context::TraceContext;

/// Process-wide telemetry state.
pub struct Telemetry {
    service_name: String,
    sample_ratio: f64,
    active: AtomicBool,
}

impl Telemetry {
    /// Initialize telemetry from configuration.
    pub fn init(config: &ObservabilityConfig) -> Arc<Self> {
        tracing::info!(
            service_name = %config.service_name,
            sample_ratio = config.trace_sample_ratio,
            "Telemetry initialized"
        );
        Arc::new(Self {
            service_name: config.service_name.clone(),
            sample_ratio: config.trace_sample_ratio.clamp(0.0, 1.0),
            active: AtomicBool::new(true),
        })
    }

    /// A disabled instance for tests: never samples, logs nothing.
    pub fn disabled() -> Arc<Self> {
        Arc::new(Self {
            service_name: "test".to_string(),
            sample_ratio: 0.0,
            active: AtomicBool::new(true),
        })
    }

    /// Flush and deactivate. New contexts created afterwards are
    /// unsampled.
    pub fn shutdown(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::info!(service_name = %self.service_name, "Telemetry shut down");
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Create a root context with a fresh sampling decision.
    pub fn root_context(&self) -> TraceContext {
        TraceContext::root(self.sample())
    }

    /// Build the context for an inbound request: continue the caller's
    /// trace when a valid `traceparent` header is present, otherwise
    /// start a new root.
    pub fn context_for(&self, traceparent: Option<&str>) -> TraceContext {
        match traceparent.and_then(TraceContext::from_traceparent) {
            Some(parent) => parent.child(),
            None => self.root_context(),
        }
    }

    fn sample(&self) -> bool {
        if !self.active.load(Ordering::Relaxed) || self.sample_ratio <= 0.0 {
            return false;
        }
        if self.sample_ratio >= 1.0 {
            return true;
        }
        rand::thread_rng().gen_bool(self.sample_ratio)
    }
}
