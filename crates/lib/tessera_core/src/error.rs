//! Crate-wide error types.

use thiserror::Error;

/// Errors produced by the token lifecycle engine.
///
/// Missing rows are not errors: lookups return `Ok(None)`. Failed
/// credential validation is also absence, never an error, so callers cannot
/// tell which step rejected them.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No personal access client has been configured or designated.
    #[error("Personal access client not found. Please create one.")]
    PersonalAccessClientNotFound,

    /// The user-identifier payload received from the grant engine could not
    /// be decoded. Hard failure: the request must not proceed.
    #[error("Malformed owner payload: {0}")]
    MalformedOwner(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Grant engine error: {0}")]
    Grant(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
