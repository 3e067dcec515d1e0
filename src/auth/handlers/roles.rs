//! Role-management handlers.
//!
//! POST /auth/bootstrap-admin promotes the caller while no admin exists.
//! PUT /auth/users/{id}/role and PUT /auth/users/by-email/{email}/role are
//! admin-gated by the routing layer; the handlers trust their caller.

use axum::extract::{Path, State};
use axum::response::Json;
use uuid::Uuid;

use crate::auth::handlers::types::{RoleUpdateRequest, UserResponse};
use crate::auth::users;
use crate::auth::users::Role;
use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;

/// One-time promotion of the caller to admin.
///
/// Fails 403 once any admin exists; the check and the promotion commit
/// atomically, so at most one caller ever succeeds.
pub async fn bootstrap_admin(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, AuthError> {
    let promoted = users::bootstrap_admin(&state.pool, user.user_id).await?;
    Ok(Json(UserResponse::from(promoted)))
}

/// Assign a role to a user by id.
pub async fn set_role_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let role: Role = request.role.parse()?;
    let user = users::set_role_by_id(&state.pool, user_id, role).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Assign a role to a user by email.
pub async fn set_role_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let role: Role = request.role.parse()?;
    let user = users::set_role_by_email(&state.pool, &email, role).await?;
    Ok(Json(UserResponse::from(user)))
}
