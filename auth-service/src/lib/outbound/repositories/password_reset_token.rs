use async_trait::async_trait;
use auth::token::fingerprint;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::database_error;
use crate::domain::auth::models::PasswordResetToken;
use crate::domain::auth::models::TokenId;
use crate::domain::auth::ports::PasswordResetTokenStore;
use crate::domain::errors::StoreError;
use crate::domain::user::models::UserId;

/// Password reset tokens in PostgreSQL, keyed by value fingerprint.
pub struct PostgresPasswordResetTokenStore {
    pool: PgPool,
}

impl PostgresPasswordResetTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PasswordResetTokenRow {
    id: Uuid,
    user_id: i64,
    expiry_date: DateTime<Utc>,
    used: bool,
}

#[async_trait]
impl PasswordResetTokenStore for PostgresPasswordResetTokenStore {
    async fn replace_for_user(
        &self,
        token: PasswordResetToken,
    ) -> Result<PasswordResetToken, StoreError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(token.user_id.0)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expiry_date, used)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET id = EXCLUDED.id,
                token_hash = EXCLUDED.token_hash,
                expiry_date = EXCLUDED.expiry_date,
                used = EXCLUDED.used
            "#,
        )
        .bind(token.id.0)
        .bind(token.user_id.0)
        .bind(fingerprint(&token.token))
        .bind(token.expiry_date)
        .bind(token.used)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(token)
    }

    async fn find_by_value(&self, token: &str) -> Result<Option<PasswordResetToken>, StoreError> {
        let row = sqlx::query_as::<_, PasswordResetTokenRow>(
            r#"
            SELECT id, user_id, expiry_date, used
            FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(fingerprint(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|r| PasswordResetToken {
            id: TokenId(r.id),
            user_id: UserId(r.user_id),
            token: token.to_string(),
            expiry_date: r.expiry_date,
            used: r.used,
        }))
    }

    async fn mark_used(&self, id: TokenId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE password_reset_tokens SET used = TRUE WHERE id = $1 AND used = FALSE",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_by_user_id(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: TokenId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }
}
