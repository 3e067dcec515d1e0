//! Router assembly.

use axum::http::StatusCode;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::routes::api_routes::configure_auth_routes;
use crate::server::state::AppState;

/// Build the full application router: the auth routes, request tracing, and
/// a 404 fallback.
pub fn create_router(app_state: AppState) -> Router<()> {
    configure_auth_routes(app_state.clone())
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .with_state(app_state)
}
