use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::CredentialError;
use crate::domain::auth::models::AuthenticationResult;
use crate::domain::auth::models::IssuedAccessToken;
use crate::domain::auth::models::PasswordResetToken;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::TokenLifetimes;
use crate::domain::auth::ports::AccessTokenCodec;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::Clock;
use crate::domain::auth::ports::CredentialVerifier;
use crate::domain::auth::ports::EmailDelivery;
use crate::domain::auth::ports::PasswordResetTokenStore;
use crate::domain::auth::ports::RandomTokenSource;
use crate::domain::auth::ports::RefreshTokenStore;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserDirectory;

/// Domain service implementation for credential lifecycle operations.
///
/// Sequences the verifier, the user directory, both token stores and the
/// access token codec. Holds no mutable state of its own.
pub struct AuthService<U, C, R, P, A, E>
where
    U: UserDirectory,
    C: CredentialVerifier,
    R: RefreshTokenStore,
    P: PasswordResetTokenStore,
    A: AccessTokenCodec,
    E: EmailDelivery,
{
    users: Arc<U>,
    credentials: Arc<C>,
    refresh_tokens: Arc<R>,
    reset_tokens: Arc<P>,
    access_tokens: Arc<A>,
    email: Arc<E>,
    clock: Arc<dyn Clock>,
    token_source: Arc<dyn RandomTokenSource>,
    lifetimes: TokenLifetimes,
}

impl<U, C, R, P, A, E> AuthService<U, C, R, P, A, E>
where
    U: UserDirectory,
    C: CredentialVerifier,
    R: RefreshTokenStore,
    P: PasswordResetTokenStore,
    A: AccessTokenCodec,
    E: EmailDelivery,
{
    /// Create a new credential service with injected dependencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<U>,
        credentials: Arc<C>,
        refresh_tokens: Arc<R>,
        reset_tokens: Arc<P>,
        access_tokens: Arc<A>,
        email: Arc<E>,
        clock: Arc<dyn Clock>,
        token_source: Arc<dyn RandomTokenSource>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            users,
            credentials,
            refresh_tokens,
            reset_tokens,
            access_tokens,
            email,
            clock,
            token_source,
            lifetimes,
        }
    }

    /// Re-read `user` from the directory and confirm it still owns its username.
    async fn canonical_user(&self, user: &User) -> Result<User, AuthError> {
        match self.users.find_by_username(user.username.as_str()).await? {
            Some(canonical) if canonical.id == user.id && canonical.enabled => Ok(canonical),
            _ => {
                tracing::warn!(user_id = %user.id, "Token owner no longer matches directory");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

/// Treat empty strings like missing tokens.
fn present(token: Option<&str>) -> Option<&str> {
    token.filter(|value| !value.is_empty())
}

#[async_trait]
impl<U, C, R, P, A, E> AuthServicePort for AuthService<U, C, R, P, A, E>
where
    U: UserDirectory,
    C: CredentialVerifier,
    R: RefreshTokenStore,
    P: PasswordResetTokenStore,
    A: AccessTokenCodec,
    E: EmailDelivery,
{
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticationResult, AuthError> {
        let authenticated = match self.credentials.authenticate(username, password).await {
            Ok(user) => user,
            Err(CredentialError::InvalidCredentials) => {
                tracing::warn!("Login rejected: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let user = self
            .users
            .find_by_username(authenticated.username.as_str())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let refresh_token = RefreshToken::issue(
            user.id,
            self.token_source.generate(),
            self.clock.now(),
            self.lifetimes.refresh_token,
        );
        let refresh_token = self.refresh_tokens.replace_for_user(refresh_token).await?;

        let access_token =
            self.access_tokens
                .issue(user.id, user.username.as_str(), &user.roles)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthenticationResult {
            access_token: access_token.token,
            access_token_expires_at: access_token.expires_at,
            refresh_token: refresh_token.token,
            refresh_token_expires_at: refresh_token.expiry_date,
        })
    }

    async fn refresh_access_token(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<IssuedAccessToken, AuthError> {
        let value = present(refresh_token).ok_or(AuthError::InvalidToken)?;

        let token = self
            .refresh_tokens
            .find_by_value(value)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !token.is_usable(self.clock.now()) {
            self.refresh_tokens.delete_by_id(token.id).await?;
            tracing::info!(
                user_id = %token.user_id,
                revoked = token.revoked,
                "Discarded unusable refresh token"
            );
            return Err(AuthError::TokenExpired);
        }

        let owner = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(token.user_id.to_string()))?;
        let user = self.canonical_user(&owner).await?;

        let access_token =
            self.access_tokens
                .issue(user.id, user.username.as_str(), &user.roles)?;

        tracing::debug!(user_id = %user.id, "Access token refreshed");
        Ok(access_token)
    }

    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let value = present(refresh_token).ok_or(AuthError::InvalidToken)?;

        match self.refresh_tokens.find_by_value(value).await? {
            Some(token) => {
                let removed = self.refresh_tokens.delete_by_user_id(token.user_id).await?;
                tracing::info!(user_id = %token.user_id, removed, "User logged out");
            }
            None => tracing::debug!("Logout with unknown refresh token"),
        }

        Ok(())
    }

    async fn request_password_reset(&self, username: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;

        let reset_token = PasswordResetToken::issue(
            user.id,
            self.token_source.generate(),
            self.clock.now(),
            self.lifetimes.password_reset,
        );
        let reset_token = self.reset_tokens.replace_for_user(reset_token).await?;

        if let Err(e) = self
            .email
            .send_password_reset_notification(&user.email, &reset_token.token)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Password reset notification failed");
            return Err(e.into());
        }

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let reset_token = self
            .reset_tokens
            .find_by_value(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if reset_token.is_expired(self.clock.now()) {
            self.reset_tokens.delete_by_id(reset_token.id).await?;
            tracing::info!(user_id = %reset_token.user_id, "Discarded expired password reset token");
            return Err(AuthError::TokenExpired);
        }

        if reset_token.used {
            tracing::warn!(user_id = %reset_token.user_id, "Replay of used password reset token");
            return Err(AuthError::InvalidToken);
        }

        let mut user = self
            .users
            .find_by_id(reset_token.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(reset_token.user_id.to_string()))?;

        // Claim the token before the password changes; only one concurrent
        // redemption can win.
        if !self.reset_tokens.mark_used(reset_token.id).await? {
            tracing::warn!(user_id = %reset_token.user_id, "Password reset token already claimed");
            return Err(AuthError::InvalidToken);
        }

        user.password_hash = self.credentials.hash_password(new_password)?;
        let user = self.users.save(user).await?;

        self.reset_tokens.delete_by_user_id(user.id).await?;

        // Sessions opened with the old password must not survive the change.
        let sessions = self.refresh_tokens.delete_by_user_id(user.id).await?;

        tracing::info!(user_id = %user.id, sessions, "Password reset completed");
        Ok(())
    }

    async fn validate_reset_token(&self, token: &str) -> Result<bool, AuthError> {
        // Expired tokens are left for reset_password to discard, so a later
        // redemption attempt still reports TokenExpired.
        let valid = self
            .reset_tokens
            .find_by_value(token)
            .await?
            .is_some_and(|reset_token| reset_token.is_redeemable(self.clock.now()));

        Ok(valid)
    }

    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        if self
            .users
            .find_by_username(command.username.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        if self
            .users
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.credentials.hash_password(&command.password)?;
        let user = User::register(
            command.username,
            command.email,
            password_hash,
            self.clock.now(),
        );

        let created = self.users.save(user).await?;

        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(created)
    }
}
