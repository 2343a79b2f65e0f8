//! Authentication error types.

use thiserror::Error;

use guichet_store::StoreError;

/// Errors that can occur during authentication.
///
/// None of these cross the [`authenticate`] boundary; they exist to keep the
/// rejection reason visible in debug logs before the result collapses to an
/// empty identifier.
///
/// [`authenticate`]: crate::Authenticator::authenticate
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token is not a dot-separated credential with a base64 payload segment.
    #[error("malformed token")]
    MalformedToken,

    /// Payload segment decoded but is not a valid claim document.
    #[error("invalid claim payload")]
    InvalidClaims,

    /// Presence marker missing, falsy, or not boolean-interpretable.
    #[error("no session for token")]
    NotAuthenticated,

    /// Store error. Deliberately not distinguished from "not authenticated"
    /// at the caller boundary; a single store error is a definitive
    /// rejection, never a reason to retry or wait.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
