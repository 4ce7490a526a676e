use std::collections::BTreeSet;
use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Identifier of a persisted refresh or password-reset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(pub Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Session-continuation credential. At most one exists per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: TokenId,
    pub user_id: UserId,
    /// Opaque bearer value handed to the client.
    pub token: String,
    pub expiry_date: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshToken {
    /// New unrevoked token for `user_id` expiring `time_to_live` after `now`.
    pub fn issue(user_id: UserId, token: String, now: DateTime<Utc>, time_to_live: Duration) -> Self {
        Self {
            id: TokenId::new(),
            user_id,
            token,
            expiry_date: expiry_after(now, time_to_live),
            revoked: false,
        }
    }

    /// Expired at or after `expiry_date`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }
}

/// `now + time_to_live`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, time_to_live: Duration) -> DateTime<Utc> {
    now.checked_add_signed(time_to_live)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Pending password reset attempt. At most one exists per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub id: TokenId,
    pub user_id: UserId,
    pub token: String,
    pub expiry_date: DateTime<Utc>,
    pub used: bool,
}

impl PasswordResetToken {
    pub fn issue(user_id: UserId, token: String, now: DateTime<Utc>, time_to_live: Duration) -> Self {
        Self {
            id: TokenId::new(),
            user_id,
            token,
            expiry_date: expiry_after(now, time_to_live),
            used: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }
}

/// How long stateful tokens stay valid after issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub refresh_token: Duration,
    pub password_reset: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            refresh_token: Duration::days(7),
            password_reset: Duration::minutes(30),
        }
    }
}

/// Identity asserted by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub roles: BTreeSet<Role>,
}

/// Signed access token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Command to register a new account with validated fields.
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// # Arguments
    /// * `username` - Validated username
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(username: Username, email: EmailAddress, password: String) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}
