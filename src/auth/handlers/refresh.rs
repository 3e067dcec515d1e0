//! Refresh and logout handlers for POST /auth/refresh and POST /auth/logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Json};

use crate::auth::handlers::cookies::{clear_refresh_cookie, extract_refresh_cookie, refresh_cookie};
use crate::auth::handlers::types::TokenResponse;
use crate::auth::sessions;
use crate::error::AuthError;
use crate::server::state::AppState;

/// Rotate the refresh session presented in the cookie.
///
/// A missing cookie, or a token whose session was already rotated, revoked,
/// or expired, fails 401. On success the superseding refresh token replaces
/// the cookie and a fresh access token is returned in the body.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_refresh_cookie(&headers).ok_or(AuthError::Unauthorized)?;
    let tokens = sessions::refresh(&state.pool, &state.issuer, &token).await?;

    let cookie = refresh_cookie(&tokens.refresh_token, tokens.max_age_seconds);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(TokenResponse::bearer(tokens.access_token)),
    ))
}

/// Revoke the session behind the presented cookie and clear it.
///
/// Always answers 204: an absent or undecodable token is not an error here,
/// and revoking an already-revoked session is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    if let Some(token) = extract_refresh_cookie(&headers) {
        sessions::logout(&state.pool, &state.issuer, &token).await?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, clear_refresh_cookie().to_string())]),
    ))
}
