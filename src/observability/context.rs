//! Trace context propagation.
//!
//! # Responsibilities
//! - Carry trace id / span id / flags / baggage with every job
//! - Parse and format the W3C `traceparent` header
//! - Derive child contexts across internal boundaries
//!
//! # Design Decisions
//! - Context is a plain value type, copied into every job; propagation
//!   always produces a new value, never mutates in place
//! - Baggage uses a `BTreeMap` for deterministic iteration order
//! - Span lifecycle and exporters live in the tracing SDK, not here

use std::collections::BTreeMap;

use rand::Rng;

/// Trace flag constants (W3C trace-context).
pub mod flags {
    pub const NONE: u8 = 0x00;
    /// Bit 0: trace is sampled/recorded.
    pub const SAMPLED: u8 = 0x01;
}

/// The context that flows with every job through the pipeline.
///
/// Created once per external request (root) or derived as a child
/// (same trace id, new span id) when crossing an internal boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// 128-bit trace id, shared by every span in the trace.
    pub trace_id: u128,
    /// 64-bit id of the current span.
    pub span_id: u64,
    /// W3C trace flags; bit 0 is the sampled flag.
    pub trace_flags: u8,
    /// User-defined key/value pairs that cross service boundaries.
    pub baggage: BTreeMap<String, String>,
}

impl TraceContext {
    /// Create a new root context, starting a new trace.
    pub fn root(sampled: bool) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            trace_id: nonzero_u128(&mut rng),
            span_id: nonzero_u64(&mut rng),
            trace_flags: if sampled { flags::SAMPLED } else { flags::NONE },
            baggage: BTreeMap::new(),
        }
    }

    /// Derive a child context: same trace id, flags, and baggage, with
    /// a fresh span id.
    pub fn child(&self) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            trace_id: self.trace_id,
            span_id: nonzero_u64(&mut rng),
            trace_flags: self.trace_flags,
            baggage: self.baggage.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.trace_id != 0
    }

    pub fn is_sampled(&self) -> bool {
        self.trace_flags & flags::SAMPLED != 0
    }

    /// Format as a single-line W3C `traceparent` header value:
    /// `00-{trace_id:32 hex}-{span_id:16 hex}-{flags:2 hex}`.
    pub fn to_traceparent(&self) -> String {
        format!(
            "00-{:032x}-{:016x}-{:02x}",
            self.trace_id, self.span_id, self.trace_flags
        )
    }

    /// Parse a W3C `traceparent` header value.
    ///
    /// Returns `None` for malformed headers, unknown versions, or
    /// all-zero trace ids.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let trace_flags = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        if version != "00" || trace_id.len() != 32 || span_id.len() != 16 || trace_flags.len() != 2
        {
            return None;
        }

        let trace_id = u128::from_str_radix(trace_id, 16).ok()?;
        let span_id = u64::from_str_radix(span_id, 16).ok()?;
        let trace_flags = u8::from_str_radix(trace_flags, 16).ok()?;
        if trace_id == 0 || span_id == 0 {
            return None;
        }

        Some(Self {
            trace_id,
            span_id,
            trace_flags,
            baggage: BTreeMap::new(),
        })
    }
}

fn nonzero_u128(rng: &mut impl Rng) -> u128 {
    loop {
        let v: u128 = rng.gen();
        if v != 0 {
            return v;
        }
    }
}

fn nonzero_u64(rng: &mut impl Rng) -> u64 {
    loop {
        let v: u64 = rng.gen();
        if v != 0 {
            return v;
        }
    }
}
