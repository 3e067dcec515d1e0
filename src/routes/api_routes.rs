//! Auth route configuration.
//!
//! Three groups with different protection levels:
//!
//! - Public: register, login, refresh, logout. Refresh and logout
//!   authenticate through the refresh cookie, not the bearer middleware.
//! - Bearer-gated: me, profile, bootstrap-admin.
//! - Admin-gated: the role-assignment endpoints, layered with both the
//!   bearer middleware and the admin gate.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;

use crate::auth::handlers::{
    bootstrap_admin, get_me, get_profile, login, logout, refresh, register, set_role_by_email,
    set_role_by_id, update_profile,
};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::server::state::AppState;

pub fn configure_auth_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout));

    let protected = Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/me/profile", get(get_profile).put(update_profile))
        .route("/auth/bootstrap-admin", post(bootstrap_admin))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    // Layers run outermost-last: auth_middleware authenticates before
    // require_admin inspects the attached identity.
    let admin = Router::new()
        .route("/auth/users/{id}/role", put(set_role_by_id))
        .route("/auth/users/by-email/{email}/role", put(set_role_by_email))
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(from_fn_with_state(state, auth_middleware));

    public.merge(protected).merge(admin)
}
