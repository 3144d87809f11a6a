//! # Proto
//!
//! What travels over the wire between the client and the Valkey HTTP
//! service, and how failures on that wire are classified.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and status/transport mapping
//! - [`wire`] - JSON request and response bodies

/// Error types.
pub mod error;
pub(crate) mod wire;
