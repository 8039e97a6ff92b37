//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ingress request
//!     → telemetry.rs (parse traceparent / start root trace)
//!     → context.rs (value copied into every Job)
//!     → re-emitted on outbound data service calls
//!
//! All subsystems produce:
//!     → tracing events (structured fields, trace/session ids)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The trace context is a plain value; span creation and export are
//!   the tracing SDK's concern, not this crate's
//! - Telemetry is injected, never looked up through a global
//! - Metric updates are cheap enough for the request hot path

pub mod context;
pub mod metrics;
pub mod telemetry;

pub use context::TraceContext;
pub use telemetry::Telemetry;
