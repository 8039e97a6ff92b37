//! Execution subsystem: the job model and the sharded worker pool.
//!
//! # Data Flow
//! ```text
//! ingress (request handler)
//!     → job.rs (session id + trace context + typed payload)
//!     → pool.rs submit: session_id % N picks the worker
//!     → worker thread dequeues FIFO, dispatches to the JobHandler
//!
//! adapter callback (any thread)
//!     → backend-response Job, same session id
//!     → resubmitted to the pool → same worker
//! ```
//!
//! # Design Decisions
//! - Per-worker queues (session-sharded) over one shared queue:
//!   per-session ordering is the stronger guarantee, at the cost of
//!   possible imbalance under skewed session distributions

pub mod job;
pub mod pool;

pub use job::{Job, JobPayload};
pub use pool::{JobHandler, JobSink, ShardedPool};
