use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AccessTokenError;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::CredentialError;
use crate::domain::auth::errors::EmailDeliveryError;
use crate::domain::auth::models::AuthenticationResult;
use crate::domain::auth::models::Identity;
use crate::domain::auth::models::IssuedAccessToken;
use crate::domain::auth::models::PasswordResetToken;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::TokenId;
use crate::domain::errors::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for credential lifecycle operations.
///
/// This is the whole surface offered to request handlers.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify a username/password pair and open a session.
    ///
    /// Replaces any refresh token the user already held.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user, wrong password or disabled account
    async fn login(&self, username: &str, password: &str)
        -> Result<AuthenticationResult, AuthError>;

    /// Mint a new access token from a refresh token.
    ///
    /// The refresh token itself is left untouched.
    ///
    /// # Errors
    /// * `InvalidToken` - Token absent or unknown
    /// * `TokenExpired` - Token expired or revoked (it is deleted first)
    /// * `UserNotFound` - Owner no longer exists
    /// * `InvalidCredentials` - Owner no longer matches the directory
    async fn refresh_access_token(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<IssuedAccessToken, AuthError>;

    /// End the session the refresh token belongs to.
    ///
    /// Unknown tokens are accepted silently.
    ///
    /// # Errors
    /// * `InvalidToken` - Token absent
    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError>;

    /// Issue a password-reset token and mail it to the account owner.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this username
    /// * `EmailDelivery` - Notification could not be sent
    async fn request_password_reset(&self, username: &str) -> Result<(), AuthError>;

    /// Redeem a password-reset token and set a new password.
    ///
    /// # Errors
    /// * `InvalidToken` - Token unknown or already used
    /// * `TokenExpired` - Token expired (it is deleted first)
    /// * `UserNotFound` - Owner no longer exists
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Check whether a password-reset token could still be redeemed.
    ///
    /// Never mutates the store. Only technical failures are reported as errors.
    async fn validate_reset_token(&self, token: &str) -> Result<bool, AuthError>;

    /// Create a new account with the default role.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;
}

/// Checks username/password pairs and hashes new passwords.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Resolve the user owning these credentials.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user, wrong password or disabled account
    /// * `Store` - Directory lookup failed
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, CredentialError>;

    /// One-way salted hash of a plaintext password.
    ///
    /// # Errors
    /// * `Hashing` - Hashing operation failed
    fn hash_password(&self, password: &str) -> Result<String, CredentialError>;
}

/// Creates and verifies stateless signed access tokens.
pub trait AccessTokenCodec: Send + Sync + 'static {
    /// # Errors
    /// * `Signing` - Token could not be signed
    fn issue(
        &self,
        user_id: UserId,
        username: &str,
        roles: &BTreeSet<Role>,
    ) -> Result<IssuedAccessToken, AccessTokenError>;

    /// # Errors
    /// * `Invalid` - Token expired, malformed, wrongly signed or foreign
    fn verify(&self, token: &str) -> Result<Identity, AccessTokenError>;
}

/// Persistence for refresh tokens. Validity checks belong to the caller.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Atomically delete every token of `token.user_id` and store `token`.
    ///
    /// Two concurrent replacements for the same user leave exactly one token.
    async fn replace_for_user(&self, token: RefreshToken) -> Result<RefreshToken, StoreError>;

    async fn find_by_value(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Mark a token revoked.
    ///
    /// # Returns
    /// False if no token has this value
    async fn revoke(&self, token: &str) -> Result<bool, StoreError>;

    /// # Returns
    /// Number of tokens removed
    async fn delete_by_user_id(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// Deleting an absent token is not an error.
    async fn delete_by_id(&self, id: TokenId) -> Result<(), StoreError>;
}

/// Persistence for password-reset tokens. Validity checks belong to the caller.
#[async_trait]
pub trait PasswordResetTokenStore: Send + Sync + 'static {
    /// Atomically delete every token of `token.user_id` and store `token`.
    async fn replace_for_user(
        &self,
        token: PasswordResetToken,
    ) -> Result<PasswordResetToken, StoreError>;

    async fn find_by_value(&self, token: &str) -> Result<Option<PasswordResetToken>, StoreError>;

    /// Atomically flag an unused token as consumed.
    ///
    /// # Returns
    /// True only for the one caller that flipped the flag; false if the token
    /// is absent or was already used
    async fn mark_used(&self, id: TokenId) -> Result<bool, StoreError>;

    /// # Returns
    /// Number of tokens removed
    async fn delete_by_user_id(&self, user_id: UserId) -> Result<u64, StoreError>;

    async fn delete_by_id(&self, id: TokenId) -> Result<(), StoreError>;
}

/// Outbound notifications about credentials.
#[async_trait]
pub trait EmailDelivery: Send + Sync + 'static {
    /// # Errors
    /// * `DeliveryFailed` - Message could not be handed to the mail system
    async fn send_password_reset_notification(
        &self,
        email: &EmailAddress,
        token: &str,
    ) -> Result<(), EmailDeliveryError>;
}

/// Source of "now" for every expiry decision.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of unpredictable opaque token values.
pub trait RandomTokenSource: Send + Sync + 'static {
    fn generate(&self) -> String;
}
