//! Login handler for POST /auth/login.
//!
//! On success the access token is returned in the body and the refresh
//! token is set as an HttpOnly cookie. An unknown identifier and a wrong
//! password produce the same 401 so callers cannot enumerate accounts.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Json};

use crate::auth::handlers::cookies::refresh_cookie;
use crate::auth::handlers::types::{LoginRequest, TokenResponse};
use crate::auth::sessions;
use crate::error::AuthError;
use crate::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let (_user, tokens) = sessions::login(
        &state.pool,
        &state.issuer,
        &request.identifier,
        &request.password,
    )
    .await?;

    let cookie = refresh_cookie(&tokens.refresh_token, tokens.max_age_seconds);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(TokenResponse::bearer(tokens.access_token)),
    ))
}
