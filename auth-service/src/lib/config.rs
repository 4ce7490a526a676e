use std::env;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::auth::models::TokenLifetimes;
use crate::outbound::tokens::AccessTokenSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    pub refresh_token_ttl_days: i64,
    pub password_reset_ttl_minutes: i64,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            refresh_token_ttl_days: 7,
            password_reset_ttl_minutes: 30,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize::<Config>()?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::Message(
                "jwt.secret must be at least 32 bytes".to_string(),
            ));
        }
        self.access_token_settings()?;
        self.token_lifetimes()?;
        Ok(self)
    }

    /// # Errors
    /// * `Message` - Access token lifetime outside `1..=MAX_ACCESS_TOKEN_TTL_MINUTES`
    pub fn access_token_settings(&self) -> Result<AccessTokenSettings, ConfigError> {
        Ok(AccessTokenSettings {
            secret: self.jwt.secret.clone(),
            issuer: self.jwt.issuer.clone(),
            time_to_live: bounded(
                "jwt.access_token_ttl_minutes",
                self.jwt.access_token_ttl_minutes,
                MAX_ACCESS_TOKEN_TTL_MINUTES,
                Duration::try_minutes,
            )?,
        })
    }

    /// # Errors
    /// * `Message` - A token lifetime is not positive or exceeds its maximum
    pub fn token_lifetimes(&self) -> Result<TokenLifetimes, ConfigError> {
        Ok(TokenLifetimes {
            refresh_token: bounded(
                "tokens.refresh_token_ttl_days",
                self.tokens.refresh_token_ttl_days,
                MAX_REFRESH_TOKEN_TTL_DAYS,
                Duration::try_days,
            )?,
            password_reset: bounded(
                "tokens.password_reset_ttl_minutes",
                self.tokens.password_reset_ttl_minutes,
                MAX_PASSWORD_RESET_TTL_MINUTES,
                Duration::try_minutes,
            )?,
        })
    }
}

/// One day.
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// One year.
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;
/// One day.
pub const MAX_PASSWORD_RESET_TTL_MINUTES: i64 = 24 * 60;

fn bounded(
    key: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if !(1..=max).contains(&value) {
        return Err(ConfigError::Message(format!(
            "{key} must be between 1 and {max}, got {value}"
        )));
    }
    to_duration(value).ok_or_else(|| ConfigError::Message(format!("{key} is out of range")))
}
