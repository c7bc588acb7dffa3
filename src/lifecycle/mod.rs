//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Register routes → Seal registry → Bind listener
//!
//! Shutdown:
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: every route must be registered before the transport
//!   binds; a request can never observe a half-populated registry
//! - Shutdown is a broadcast; the server and background tasks subscribe

pub mod shutdown;

pub use shutdown::Shutdown;
