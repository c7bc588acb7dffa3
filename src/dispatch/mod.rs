//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Transport request (matched method + path pattern)
//!     → context.rs (fresh RequestContext / ResponseContext per request)
//!     → dispatcher.rs (guard → middleware chain → handler)
//!     → success: response written from the accumulated ResponseContext
//!     → failure: handed to errors::normalize, never serialized here
//! ```
//!
//! # Design Decisions
//! - Contexts are per-request values, never shared or reused
//! - Middleware and handlers thread the ResponseContext by value; a failed
//!   step surrenders it, and the normalizer writes its own response
//! - Exactly one response per request on every code path

pub mod context;
pub mod dispatcher;

pub use context::{
    handler_fn, middleware_fn, Completed, Flow, Handler, HandlerFactory, HandlerResult,
    Middleware, MiddlewareResult, RequestContext, ResponseContext,
};
pub use dispatcher::Dispatcher;
