//! HTTP transport binding subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum)
//!     → request.rs (request id layer: uuid in, header out, span)
//!     → server.rs (fixed endpoints, per-route dispatch entry, fallback)
//!     → dispatch::Dispatcher (guard → middleware → handler)
//!     → Response to client
//! ```
//!
//! # Design Decisions
//! - axum owns sockets, body delivery, and path-pattern matching
//! - One axum route per registered definition; everything else falls through
//!   to a 404 shaped by the error normalizer
//! - The registry is sealed before the listener binds

pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdLayer, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
