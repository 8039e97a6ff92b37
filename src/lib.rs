//! URL Shortener Service Core
//!
//! The request-processing core of a small service framework built with
//! Tokio and Axum: an HTTP endpoint accepts a request, hands it to a
//! bounded, session-affine worker pool, the worker issues an
//! asynchronous call to the backend data service, and the eventual
//! result is delivered back to the original HTTP connection.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                  SHORTENER CORE                       │
//!                   │                                                       │
//!   Client Request  │  ┌────────┐   ┌─────────┐   ┌───────────┐            │
//!   ────────────────┼─▶│  http  │──▶│ routing │──▶│ admission │            │
//!                   │  │ server │   │  trie   │   │   gate    │            │
//!                   │  └────────┘   └─────────┘   └─────┬─────┘            │
//!                   │                                    │ Job              │
//!                   │                                    ▼                  │
//!                   │                            ┌──────────────┐          │
//!                   │                            │  execution   │          │
//!                   │                            │ sharded pool │          │
//!                   │                            └──────┬───────┘          │
//!                   │                                    │                  │
//!                   │                                    ▼                  │
//!   Client Response │  ┌──────────┐   ┌─────────┐  ┌──────────────┐        │
//!   ◀───────────────┼──│ response │◀──│ handler │◀─│ data_service │◀───────┼── Backend
//!                   │  │  handle  │   │  chain  │  │   adapter    │        │     Store
//!                   │  └──────────┘   └─────────┘  └──────────────┘        │
//!                   │                                                       │
//!                   │  ┌─────────────────────────────────────────────────┐ │
//!                   │  │            Cross-Cutting Concerns                │ │
//!                   │  │  ┌────────┐ ┌───────────────┐ ┌──────────────┐  │ │
//!                   │  │  │ config │ │ observability │ │ trace context│  │ │
//!                   │  │  └────────┘ └───────────────┘ └──────────────┘  │ │
//!                   │  └─────────────────────────────────────────────────┘ │
//!                   └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Invariants
//!
//! - Jobs for one session id always land on the same worker, in
//!   submission order (per-session FIFO).
//! - A response is completed exactly once, from whichever thread gets
//!   there first; writes after close are silently dropped.
//! - Load shedding happens before any queueing: a rejected request
//!   costs one atomic compare-and-swap.

// Core subsystems
pub mod config;
pub mod execution;
pub mod http;
pub mod routing;

// Request pipeline
pub mod admission;
pub mod data_service;
pub mod handler;

// Cross-cutting concerns
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
