use async_trait::async_trait;
use auth::token::fingerprint;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::database_error;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::TokenId;
use crate::domain::auth::ports::RefreshTokenStore;
use crate::domain::errors::StoreError;
use crate::domain::user::models::UserId;

/// Refresh tokens in PostgreSQL.
///
/// Only the SHA-256 fingerprint of a token value is stored; lookups hash the
/// presented value and compare fingerprints.
pub struct PostgresRefreshTokenStore {
    pool: PgPool,
}

impl PostgresRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: i64,
    expiry_date: DateTime<Utc>,
    revoked: bool,
}

impl RefreshTokenRow {
    fn into_token(self, value: &str) -> RefreshToken {
        RefreshToken {
            id: TokenId(self.id),
            user_id: UserId(self.user_id),
            token: value.to_string(),
            expiry_date: self.expiry_date,
            revoked: self.revoked,
        }
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn replace_for_user(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(token.user_id.0)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        // A concurrent replacement may commit between the delete and the insert.
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expiry_date, revoked)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET id = EXCLUDED.id,
                token_hash = EXCLUDED.token_hash,
                expiry_date = EXCLUDED.expiry_date,
                revoked = EXCLUDED.revoked
            "#,
        )
        .bind(token.id.0)
        .bind(token.user_id.0)
        .bind(fingerprint(&token.token))
        .bind(token.expiry_date)
        .bind(token.revoked)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(token)
    }

    async fn find_by_value(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, user_id, expiry_date, revoked
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(fingerprint(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|r| r.into_token(token)))
    }

    async fn revoke(&self, token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = $1")
            .bind(fingerprint(token))
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user_id(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: TokenId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }
}
