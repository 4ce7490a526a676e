use serde::Deserialize;
use serde::Serialize;

/// Access token claims.
///
/// Standard RFC 7519 registered claims plus the identity the credential
/// service asserts: username and role names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (numeric user identifier, rendered as a string)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Login name of the subject at issuance time
    pub username: String,

    /// Role names granted to the subject at issuance time
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Create claims for an authenticated user.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `username` - Username of the subject
    /// * `roles` - Role names of the subject
    /// * `issued_at` - Issuance instant (Unix timestamp)
    /// * `ttl_seconds` - Seconds until the token expires
    ///
    /// # Returns
    /// Claims with sub, iat, exp, username and roles set
    pub fn for_user(
        user_id: impl ToString,
        username: impl Into<String>,
        roles: Vec<String>,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: issued_at.saturating_add(ttl_seconds),
            iat: issued_at,
            iss: None,
            username: username.into(),
            roles,
        }
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Check if the token is expired at the given instant.
    ///
    /// A token is no longer valid at the exact second of its `exp` claim.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
