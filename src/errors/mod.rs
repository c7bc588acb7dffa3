//! Failure taxonomy and normalization.
//!
//! # Data Flow
//! ```text
//! guard / middleware / handler raises
//!     → Exception (taxonomy.rs) or foreign error
//!     → normalize.rs (classify → coerce → deliver)
//!     → {name, status, message} written to the client
//! ```
//!
//! # Design Decisions
//! - Exceptions are immutable once created and flow one way
//! - The normalizer is the only component that serializes error bodies
//! - Causes and traces stay server-side; clients see the uniform shape only

pub mod normalize;
pub mod taxonomy;

pub use normalize::{ErrorNormalizer, StatusHint};
pub use taxonomy::Exception;
