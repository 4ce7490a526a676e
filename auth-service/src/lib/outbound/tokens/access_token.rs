use std::collections::BTreeSet;
use std::sync::Arc;

use auth::Claims;
use auth::JwtHandler;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::auth::errors::AccessTokenError;
use crate::domain::auth::models::Identity;
use crate::domain::auth::models::IssuedAccessToken;
use crate::domain::auth::ports::AccessTokenCodec;
use crate::domain::auth::ports::Clock;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;

/// Immutable signing configuration, loaded once at startup.
#[derive(Clone)]
pub struct AccessTokenSettings {
    pub secret: String,
    pub issuer: String,
    pub time_to_live: Duration,
}

impl std::fmt::Debug for AccessTokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("time_to_live", &self.time_to_live)
            .finish()
    }
}

/// Access token codec producing HS256 JWTs.
///
/// Expiry is judged against the injected clock, not the system clock.
pub struct JwtAccessTokenCodec {
    jwt_handler: JwtHandler,
    issuer: String,
    time_to_live: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtAccessTokenCodec {
    pub fn new(settings: &AccessTokenSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt_handler: JwtHandler::new(settings.secret.as_bytes())
                .with_issuer(settings.issuer.clone()),
            issuer: settings.issuer.clone(),
            time_to_live: settings.time_to_live,
            clock,
        }
    }
}

impl AccessTokenCodec for JwtAccessTokenCodec {
    fn issue(
        &self,
        user_id: UserId,
        username: &str,
        roles: &BTreeSet<Role>,
    ) -> Result<IssuedAccessToken, AccessTokenError> {
        let role_names = roles.iter().map(|role| role.as_str().to_string()).collect();
        let claims = Claims::for_user(
            user_id,
            username,
            role_names,
            self.clock.now().timestamp(),
            self.time_to_live.num_seconds(),
        )
        .with_issuer(self.issuer.clone());

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or_else(|| {
            AccessTokenError::Signing(format!("expiry {} is out of range", claims.exp))
        })?;

        let token = self
            .jwt_handler
            .encode(&claims)
            .map_err(|e| AccessTokenError::Signing(e.to_string()))?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<Identity, AccessTokenError> {
        let claims: Claims = self
            .jwt_handler
            .decode_ignoring_expiry(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AccessTokenError::Invalid
            })?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(AccessTokenError::Invalid);
        }

        let user_id = claims
            .sub
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| AccessTokenError::Invalid)?;

        Ok(Identity {
            user_id,
            username: claims.username,
            roles: claims.roles.into_iter().map(Role::new).collect(),
        })
    }
}
