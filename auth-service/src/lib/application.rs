use std::sync::Arc;

use config::ConfigError;
use sqlx::migrate::MigrateError;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::Config;
use crate::domain::auth::credentials::PasswordCredentialVerifier;
use crate::domain::auth::ports::Clock;
use crate::domain::auth::service::AuthService;
use crate::outbound::clock::SystemClock;
use crate::outbound::email::OutboxEmailDelivery;
use crate::outbound::repositories::connect;
use crate::outbound::repositories::PostgresPasswordResetTokenStore;
use crate::outbound::repositories::PostgresRefreshTokenStore;
use crate::outbound::repositories::PostgresUserRepository;
use crate::outbound::repositories::MIGRATOR;
use crate::outbound::tokens::JwtAccessTokenCodec;
use crate::outbound::tokens::OsRandomTokenSource;

pub type PostgresAuthService = AuthService<
    PostgresUserRepository,
    PasswordCredentialVerifier<PostgresUserRepository>,
    PostgresRefreshTokenStore,
    PostgresPasswordResetTokenStore,
    JwtAccessTokenCodec,
    OutboxEmailDelivery,
>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] MigrateError),
}

/// Credential service wired to PostgreSQL, ready to be mounted by a request
/// handling layer.
pub struct Application {
    pub service: Arc<PostgresAuthService>,
    pub outbox: Arc<OutboxEmailDelivery>,
    pub pool: PgPool,
}

impl Application {
    /// Load configuration from files and environment, then build.
    pub async fn from_environment() -> Result<Self, StartupError> {
        let config = Config::load()?;
        Self::build(&config, Arc::new(SystemClock)).await
    }

    /// Connect, migrate and wire every adapter.
    ///
    /// # Errors
    /// * `Config` - Token lifetimes out of range
    /// * `Database` - Pool could not connect
    /// * `Migration` - Schema migration failed
    pub async fn build(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, StartupError> {
        let access_token_settings = config.access_token_settings()?;
        let lifetimes = config.token_lifetimes()?;

        let pool = connect(&config.database).await?;
        tracing::info!(
            max_connections = config.database.max_connections,
            database = "postgresql",
            "Database connection pool created"
        );

        MIGRATOR.run(&pool).await?;
        tracing::info!(database = "postgresql", "Database migrations completed");

        let users = Arc::new(PostgresUserRepository::new(pool.clone()));
        let outbox = Arc::new(OutboxEmailDelivery::new(clock.clone()));

        let service = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(PasswordCredentialVerifier::new(users)),
            Arc::new(PostgresRefreshTokenStore::new(pool.clone())),
            Arc::new(PostgresPasswordResetTokenStore::new(pool.clone())),
            Arc::new(JwtAccessTokenCodec::new(&access_token_settings, clock.clone())),
            outbox.clone(),
            clock,
            Arc::new(OsRandomTokenSource::new()),
            lifetimes,
        ));

        tracing::info!(
            issuer = %access_token_settings.issuer,
            "Credential service ready"
        );

        Ok(Self {
            service,
            outbox,
            pool,
        })
    }
}
