//! Protocol-agnostic HTTP exchange model and the wire ingress.
//!
//! `request` and `response` are plain data plus a thread-safe
//! completion handle; nothing in them knows about the transport.
//! `server` is the one place wire types appear.

pub mod request;
pub mod response;
pub mod server;

pub use request::Request;
pub use response::{Response, ResponseHandle, SendFn};
pub use server::HttpServer;
