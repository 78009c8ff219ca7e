//! Errors raised by the credential and session collaborators.

use thiserror::Error;

/// Failure inside a collaborator (store unreachable, corrupt hash, ...).
///
/// This is never an authentication failure: wrong passwords are reported as
/// `Ok(false)` and callers must let a `StoreError` propagate instead of turning it
/// into a rejected login.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("account not found: {0}")]
    MissingAccount(String),
}
