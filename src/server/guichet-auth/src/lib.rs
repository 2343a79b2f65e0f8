//! # Guichet Auth
//!
//! Token-presence authentication for Guichet.
//!
//! A bearer token carries a client identifier in its payload segment; a
//! session marker keyed by that identifier and the token must exist in the
//! shared session store for the token to be accepted. The decision procedure
//! fails closed: every decode failure, store failure, or absent marker is
//! reported as "unauthenticated", never as an error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authenticator;
pub mod claims;
pub mod error;

pub use authenticator::{AuthConfig, Authenticator};
pub use error::AuthError;
