//! Application state.
//!
//! [`AppState`] is the single state container handed to the router. The
//! `FromRef` impls let handlers extract just the piece they need instead of
//! the whole state, following axum's recommended pattern. Everything here is
//! cheap to clone: the pool is a handle, the config is behind an `Arc`.

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::tokens::TokenIssuer;
use crate::server::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool; the only shared mutable state in the
    /// subsystem lives behind it.
    pub pool: PgPool,
    /// Token signer/verifier, constructed once from configuration.
    pub issuer: TokenIssuer,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let issuer = TokenIssuer::new(
            &config.jwt_secret,
            config.jwt_algorithm,
            config.access_token_ttl_minutes,
            config.refresh_token_ttl_days,
        );
        Self {
            pool,
            issuer,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.issuer.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
