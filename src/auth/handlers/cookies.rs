//! Refresh-token cookie handling.
//!
//! The refresh token travels only in an HttpOnly cookie scoped to the auth
//! endpoints, with `SameSite=Lax` and a Max-Age matching the session expiry.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
const REFRESH_COOKIE_PATH: &str = "/auth";

/// Build the Set-Cookie value carrying a refresh token.
pub fn refresh_cookie(token: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token.to_string()))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .build()
}

/// Build the Set-Cookie value that clears the refresh cookie.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

/// Extract the refresh token from request cookies, if present.
pub fn extract_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header))
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}
