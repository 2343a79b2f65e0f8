//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// Driver errors pass through unmodified: the router layer routes, it does
/// not translate, so timeout and error semantics are whatever the active
/// backend produces.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured address could not be parsed.
    #[error("invalid store address: {0}")]
    InvalidAddress(String),

    /// Connection could not be established or verified.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Native error from the active backend driver.
    #[error("driver error: {0}")]
    Driver(String),

    /// The stored value has an unexpected shape for the requested operation.
    #[error("invalid value at key {0}")]
    InvalidValue(String),
}
