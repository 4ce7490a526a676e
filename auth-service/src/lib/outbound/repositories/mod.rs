pub mod memory;
pub mod password_reset_token;
pub mod refresh_token;
pub mod user;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use memory::InMemoryPasswordResetTokenStore;
pub use memory::InMemoryRefreshTokenStore;
pub use memory::InMemoryUserDirectory;
pub use password_reset_token::PostgresPasswordResetTokenStore;
pub use refresh_token::PostgresRefreshTokenStore;
pub use user::PostgresUserRepository;

use crate::config::DatabaseConfig;
use crate::domain::errors::StoreError;

/// Schema for the `users`, `refresh_tokens` and `password_reset_tokens` tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a connection pool sized from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

fn database_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}
