//! Current-user and profile handlers.
//!
//! GET /auth/me, GET /auth/me/profile, PUT /auth/me/profile. All three sit
//! behind the bearer-token middleware; the identity comes from the
//! [`AuthUser`] extractor, never from the request body.

use axum::extract::State;
use axum::response::Json;

use crate::auth::handlers::types::UserResponse;
use crate::auth::profiles;
use crate::auth::profiles::{ProfileUpdate, UserProfile};
use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;

/// Return the authenticated user.
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// Return the caller's profile.
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = profiles::get_profile(&state.pool, user.user_id).await?;
    Ok(Json(profile))
}

/// Partially update the caller's profile; omitted fields are left alone.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = profiles::upsert_profile(&state.pool, user.user_id, update).await?;
    Ok(Json(profile))
}
