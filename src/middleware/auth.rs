//! Authentication middleware.
//!
//! Extracts the bearer token from the Authorization header, verifies it as
//! an access token, re-checks that the subject still exists in the store,
//! and attaches the authenticated user to request extensions. A second
//! layer gates admin-only routes on the user's role or the configured
//! admin allow-list.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use uuid::Uuid;

use crate::auth::tokens::TokenKind;
use crate::auth::users;
use crate::auth::users::Role;
use crate::error::AuthError;
use crate::server::state::AppState;

/// Identity attached to a request once its access token checks out.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Verify the access token and attach the caller's identity.
///
/// Returns 401 for a missing or malformed header, any token decode failure,
/// or a subject that no longer exists.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthorized)?;

    let claims = state.issuer.decode(token, TokenKind::Access)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)?;

    let user = users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        role: user.role(),
        username: user.username,
        email: user.email,
    });

    Ok(next.run(request).await)
}

/// Admit only admins (by role, or by the configured email allow-list).
///
/// Must be layered inside [`auth_middleware`]; a request that reaches it
/// without an attached identity is rejected outright.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AuthError::Unauthorized)?;

    let allow_listed = state.config.admin_emails.iter().any(|email| email == &user.email);
    if user.role != Role::Admin && !allow_listed {
        tracing::warn!("user {} denied admin action", user.username);
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Extractor handing handlers the identity attached by [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or(AuthError::Unauthorized)
    }
}
