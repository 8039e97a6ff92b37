//! Backend data service boundary.
//!
//! # Data Flow
//! ```text
//! worker thread
//!     → DataServiceRequest (operation + entity id + payload + correlation)
//!     → adapter.execute(request, callback)   [fire and forget]
//!     → backend I/O on the adapter's own runtime
//!     → callback(DataServiceResponse) on whatever thread resolves it
//! ```
//!
//! # Design Decisions
//! - Completion is always via the callback, never a return value
//! - Two failure classes are kept apart: infrastructure failures carry
//!   no domain meaning; application failures map a non-2xx status to a
//!   small domain-error table

use thiserror::Error;

use crate::http::Response;
use crate::observability::TraceContext;

pub mod http;

pub use http::HttpDataServiceAdapter;

/// Protocol-agnostic backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Find,
    Delete,
    Exists,
}

impl Operation {
    /// The HTTP verb a REST backend expects for this operation.
    pub fn http_method(&self) -> &'static str {
        match self {
            Operation::Save => "POST",
            Operation::Find => "GET",
            Operation::Delete => "DELETE",
            Operation::Exists => "HEAD",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Save => "save",
            Operation::Find => "find",
            Operation::Delete => "delete",
            Operation::Exists => "exists",
        }
    }
}

/// Application failure reported by a reachable backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    NotFound = 1,
    AlreadyExists = 2,
    InvalidRequest = 3,
    Gone = 4,
    Internal = 5,
    Unavailable = 6,
    Unknown = 99,
}

impl DomainError {
    /// Map a backend HTTP status to a domain error code.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => DomainError::NotFound,
            409 => DomainError::AlreadyExists,
            400 => DomainError::InvalidRequest,
            410 => DomainError::Gone,
            500 => DomainError::Internal,
            503 => DomainError::Unavailable,
            _ => DomainError::Unknown,
        }
    }

    /// The HTTP status surfaced to the original client.
    pub fn http_status(&self) -> u16 {
        match self {
            DomainError::NotFound => 404,
            DomainError::AlreadyExists => 409,
            DomainError::InvalidRequest => 400,
            DomainError::Gone => 410,
            DomainError::Internal => 500,
            DomainError::Unavailable => 503,
            DomainError::Unknown => 500,
        }
    }
}

/// Infrastructure failure: the backend never meaningfully answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InfraError {
    #[error("connection failed")]
    ConnectionFailed,
    #[error("deadline exceeded")]
    Timeout,
    #[error("protocol error")]
    Protocol,
}

/// One outbound backend call, with the correlation state needed to
/// complete the original HTTP exchange.
pub struct DataServiceRequest {
    pub operation: Operation,
    /// Entity id appended to the base path for id-scoped operations.
    pub entity_id: String,
    pub payload: Vec<u8>,
    /// Correlation: the response builder for the originating exchange.
    pub response: Response,
    pub trace_ctx: TraceContext,
}

/// The resolution of a backend call, consumed once by the callback.
pub struct DataServiceResponse {
    pub success: bool,
    /// Backend status code; 0 when the call never completed.
    pub http_status: u16,
    pub domain_error: Option<DomainError>,
    pub infra_error: Option<InfraError>,
    pub payload: Vec<u8>,
    /// Correlation, carried through from the request.
    pub response: Response,
}

/// Completion callback; fires exactly once per `execute` call, on
/// whatever thread the adapter's I/O resolves on.
pub type AdapterCallback = Box<dyn FnOnce(DataServiceResponse) + Send>;

/// Translates protocol-agnostic requests into concrete backend calls.
pub trait DataServiceAdapter: Send + Sync {
    /// Fire-and-forget from the caller's perspective; completion is
    /// always via `callback`.
    fn execute(&self, request: DataServiceRequest, callback: AdapterCallback);
}
