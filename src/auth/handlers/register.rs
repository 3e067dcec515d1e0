//! Registration handler for POST /auth/register.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::auth::handlers::types::{RegisterRequest, UserResponse};
use crate::auth::users;
use crate::error::AuthError;
use crate::server::state::AppState;

/// Create a user and its empty profile.
///
/// Returns 409 naming the colliding field when the username or email is
/// already taken, including when the collision only surfaces at commit time
/// because a concurrent registration won the race.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    tracing::info!("registration request for username {}", request.username);
    let user = users::register(
        &state.pool,
        &request.username,
        &request.email,
        &request.password,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
