//! Message handler chain.
//!
//! # Data Flow
//! ```text
//! matched route
//!     → request.rs (admission, session id, job handoff)
//!     → pool → observable.rs (span + metrics, by composition)
//!     → message.rs (business dispatch: HTTP ↔ data service)
//! ```

pub mod message;
pub mod observable;
pub mod request;

pub use message::ShortenerHandler;
pub use observable::ObservableHandler;
pub use request::RequestHandler;
