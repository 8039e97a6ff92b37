//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path)
//!     → router.rs (trie walk, static before parametric)
//!     → handler + captured path parameters
//!     → dispatch invokes, or answers 404 on a miss
//! ```
//!
//! # Design Decisions
//! - The trie is built once at startup and read-only under traffic
//! - Cross-cutting concerns wrap handlers at composition time; the
//!   router itself carries no middleware

pub mod router;

pub use router::{Handler, RouteMatch, Router};
