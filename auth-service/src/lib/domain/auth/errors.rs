use thiserror::Error;

use crate::domain::errors::StoreError;

/// Outcome of a failed credential check or password hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Unknown user, wrong password or disabled account; deliberately not
    /// told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error for access token operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessTokenError {
    /// Expired, malformed, wrongly signed or foreign token.
    #[error("Access token is invalid")]
    Invalid,

    #[error("Access token signing failed: {0}")]
    Signing(String),
}

/// Error for outbound email delivery
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailDeliveryError {
    #[error("Failed to deliver email to {recipient}: {reason}")]
    DeliveryFailed { recipient: String, reason: String },
}

/// Top-level error for credential lifecycle operations.
///
/// The first group is functional and maps to client-facing rejections. The
/// second group is technical and should surface as a server-side failure,
/// see [`AuthError::is_technical`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    // Infrastructure errors
    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Email delivery error: {0}")]
    EmailDelivery(#[from] EmailDeliveryError),

    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),
}

impl AuthError {
    /// True for infrastructure failures the caller did not cause.
    pub fn is_technical(&self) -> bool {
        matches!(
            self,
            AuthError::Store(_)
                | AuthError::EmailDelivery(_)
                | AuthError::PasswordHashing(_)
                | AuthError::TokenSigning(_)
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken(username) => AuthError::UsernameAlreadyExists(username),
            StoreError::EmailTaken(email) => AuthError::EmailAlreadyExists(email),
            other => AuthError::Store(other),
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => AuthError::InvalidCredentials,
            CredentialError::Hashing(reason) => AuthError::PasswordHashing(reason),
            CredentialError::Store(store) => AuthError::from(store),
        }
    }
}

impl From<AccessTokenError> for AuthError {
    fn from(err: AccessTokenError) -> Self {
        match err {
            AccessTokenError::Invalid => AuthError::InvalidToken,
            AccessTokenError::Signing(reason) => AuthError::TokenSigning(reason),
        }
    }
}
