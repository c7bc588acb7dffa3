//! Route composition subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RouteBuilder::handler(factory)
//!         .middleware(..) / .validate::<S>() / .guard() / .response_status(..)
//!         .method_and_path(method, path)   ← finalizing step
//!     → RouteDefinition (immutable)
//!     → Registry::register (duplicate (method, path) = fatal)
//!     → Registry sealed behind Arc before the transport binds
//! ```
//!
//! # Design Decisions
//! - Explicit builder value threaded through composition steps; no ambient
//!   state, no inheritance chain
//! - Middleware accumulate by prepending: the step applied last runs first
//! - The registry is immutable after startup, so concurrent request tasks
//!   read it without locks

pub mod builder;
pub mod registry;

pub use builder::{RouteBuilder, RouteDefinition};
pub use registry::{Registry, RegistryError};
