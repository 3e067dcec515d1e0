//! Server initialization.
//!
//! `create_app` stages startup: connect the pool, run migrations, build the
//! state, assemble the router. Configuration is taken as an argument rather
//! than read ambiently so tests and the binary construct the app the same
//! way.

use axum::Router;

use crate::routes::router::create_router;
use crate::server::config::{connect_database, AppConfig};
use crate::server::state::AppState;

pub async fn create_app(config: AppConfig) -> Result<Router, sqlx::Error> {
    tracing::info!("initializing fleetgate auth server");

    let pool = connect_database(&config).await?;
    let state = AppState::new(pool, config);

    Ok(create_router(state))
}
