use thiserror::Error;

use crate::user::errors::EmailError;
use crate::user::errors::UsernameError;

/// Failure reported by a persistence port.
///
/// Shared by the user directory and both token stores. Everything except the
/// two uniqueness variants is a technical failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Email already taken: {0}")]
    EmailTaken(String),

    #[error("Stored record is invalid: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<UsernameError> for StoreError {
    fn from(err: UsernameError) -> Self {
        StoreError::CorruptRecord(err.to_string())
    }
}

impl From<EmailError> for StoreError {
    fn from(err: EmailError) -> Self {
        StoreError::CorruptRecord(err.to_string())
    }
}
