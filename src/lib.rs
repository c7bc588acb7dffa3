//! Declarative route composition and dispatch for an HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//! Startup:
//!     RouteBuilder steps (guard / middleware / validate / status)
//!         → method_and_path() finalizes a RouteDefinition
//!         → Registry::register() (duplicate = fatal)
//!         → Registry sealed behind Arc
//!         → HttpServer binds the transport (axum)
//!
//! Per request:
//!     axum matches (method, path pattern)
//!         → RequestContext built from the transport request
//!         → Dispatcher: guard → middleware chain → handler
//!         → success: response_status + serialized result
//!         → any failure: ErrorNormalizer → {name, status, message}
//! ```
//!
//! The transport layer (sockets, TLS, body delivery, path-pattern matching)
//! belongs to axum. This crate owns the composition of cross-cutting concerns
//! around each handler and the failure taxonomy every error collapses into.

// Core subsystems
pub mod dispatch;
pub mod errors;
pub mod http;
pub mod route;

// Cross-cutting concerns
pub mod config;
pub mod guard;
pub mod lifecycle;
pub mod observability;
pub mod validation;

pub use config::ServiceConfig;
pub use dispatch::{handler_fn, middleware_fn, Flow, RequestContext, ResponseContext};
pub use errors::Exception;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use route::{Registry, RouteBuilder, RouteDefinition};
pub use validation::{Schema, Violation};
