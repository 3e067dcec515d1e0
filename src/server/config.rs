//! Server configuration.
//!
//! All settings come from environment variables (a `.env` file is loaded in
//! `main`), parsed once at startup into an [`AppConfig`] that is injected
//! through application state. Nothing reads the environment after startup.

use jsonwebtoken::Algorithm;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Process-wide configuration.
///
/// Deliberately does not implement `Debug`: the signing secret must never
/// reach a log line.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    /// Emails the routing layer's admin gate admits regardless of role.
    pub admin_emails: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required: every endpoint needs
    /// the store and the signer, so a server without them would be useless.
    /// Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            jwt_algorithm: parse_or("JWT_ALGORITHM", Algorithm::HS256, parse_algorithm)?,
            access_token_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", 60, |v| {
                v.parse().ok()
            })?,
            refresh_token_ttl_days: parse_or("REFRESH_TOKEN_TTL_DAYS", 30, |v| v.parse().ok())?,
            admin_emails: std::env::var("ADMIN_EMAILS")
                .map(|csv| parse_admin_emails(&csv))
                .unwrap_or_default(),
            port: parse_or("SERVER_PORT", 3000, |v| v.parse().ok())?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parse_or<T>(
    name: &'static str,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => parse(&value).ok_or(ConfigError::InvalidVar { name, value }),
    }
}

fn parse_algorithm(value: &str) -> Option<Algorithm> {
    match value {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

/// Split a comma-separated allow-list, trimming blanks.
pub fn parse_admin_emails(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect()
}

/// Connect the pool and bring the schema up to date.
///
/// Migration failures are logged but do not abort startup; they usually
/// mean the migrations already ran against this database.
pub async fn connect_database(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("connecting to database");
    let pool = PgPool::connect(&config.database_url).await?;

    if let Err(err) = sqlx::migrate!().run(&pool).await {
        tracing::error!("failed to run database migrations: {err}");
        tracing::warn!("continuing; the schema may already be up to date");
    }

    Ok(pool)
}
