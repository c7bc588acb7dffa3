//! Signed-token authentication gate.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → token.rs (extract, verify HS256 signature + exp, optional aud/iss)
//!     → verified claims attached to RequestContext
//!     → any failure: 401 before middleware or handler run
//! ```
//!
//! # Design Decisions
//! - Verification config (secret, audience, issuer) comes from ServiceConfig
//! - Claims are surfaced as plain JSON; the guard imposes no claim schema
//!   beyond what the token library validates

pub mod token;

pub use token::TokenGuard;
