//! Handler-level tests for the HTTP surface: status mapping and the
//! refresh-cookie contract.

mod common;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serial_test::serial;

use fleetgate::auth::handlers::types::{LoginRequest, RegisterRequest};
use fleetgate::auth::handlers::{login, logout, refresh, register};
use fleetgate::error::AuthError;
use fleetgate::server::state::AppState;

use common::auth_helpers::{register_test_user, test_config, TEST_PASSWORD};
use common::database::TestDatabase;

async fn test_state(db: &TestDatabase) -> AppState {
    AppState::new(db.pool().clone(), test_config())
}

/// Collapse a handler result into the response axum would produce.
fn to_response<T: IntoResponse>(result: Result<T, AuthError>) -> axum::response::Response {
    match result {
        Ok(ok) => ok.into_response(),
        Err(err) => err.into_response(),
    }
}

fn set_cookie_value(headers: &HeaderMap) -> String {
    headers
        .get(SET_COOKIE)
        .expect("response must set the refresh cookie")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
#[serial]
async fn test_register_handler_created_and_conflict() {
    let db = TestDatabase::new().await;
    let state = test_state(&db).await;

    let request = RegisterRequest {
        username: "rider".to_string(),
        email: "rider@example.com".to_string(),
        password: TEST_PASSWORD.to_string(),
    };
    let (status, Json(body)) = register(State(state.clone()), Json(request)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.username, "rider");
    assert_eq!(body.role, "admin");

    let duplicate = RegisterRequest {
        username: "rider".to_string(),
        email: "other@example.com".to_string(),
        password: TEST_PASSWORD.to_string(),
    };
    let err = register(State(state), Json(duplicate)).await.unwrap_err();
    assert_matches!(err, AuthError::Conflict { field: "username" });
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_login_handler_sets_refresh_cookie() {
    let db = TestDatabase::new().await;
    let state = test_state(&db).await;
    register_test_user(db.pool(), "alice", "alice@x.com").await;

    let request = LoginRequest {
        identifier: "alice@x.com".to_string(),
        password: TEST_PASSWORD.to_string(),
    };
    let response = login(State(state), Json(request))
        .await
        .unwrap()
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie_value(response.headers());
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/auth"));
    assert!(cookie.contains("Max-Age="));
}

#[tokio::test]
#[serial]
async fn test_login_handler_rejects_wrong_password() {
    let db = TestDatabase::new().await;
    let state = test_state(&db).await;
    register_test_user(db.pool(), "alice", "alice@x.com").await;

    let request = LoginRequest {
        identifier: "alice@x.com".to_string(),
        password: "wrong".to_string(),
    };
    let response = to_response(login(State(state), Json(request)).await);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_refresh_handler_rotates_cookie() {
    let db = TestDatabase::new().await;
    let state = test_state(&db).await;
    register_test_user(db.pool(), "alice", "alice@x.com").await;

    let request = LoginRequest {
        identifier: "alice".to_string(),
        password: TEST_PASSWORD.to_string(),
    };
    let response = login(State(state.clone()), Json(request))
        .await
        .unwrap()
        .into_response();
    let login_cookie = set_cookie_value(response.headers());
    let cookie_pair = login_cookie.split(';').next().unwrap().to_string();

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, cookie_pair.parse().unwrap());
    let response = refresh(State(state.clone()), headers.clone())
        .await
        .unwrap()
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let rotated_cookie = set_cookie_value(response.headers());
    assert_ne!(rotated_cookie, login_cookie);

    // The old cookie was rotated away; presenting it again is a replay.
    let replay = to_response(refresh(State(state), headers).await);
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_refresh_handler_without_cookie() {
    let db = TestDatabase::new().await;
    let state = test_state(&db).await;

    let response = to_response(refresh(State(state), HeaderMap::new()).await);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_logout_handler_always_clears_cookie() {
    let db = TestDatabase::new().await;
    let state = test_state(&db).await;

    // No cookie at all: still 204 with a clearing Set-Cookie.
    let response = logout(State(state.clone()), HeaderMap::new())
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = set_cookie_value(response.headers());
    assert!(cookie.starts_with("refresh_token=;") || cookie.starts_with("refresh_token=\"\""));
    assert!(cookie.contains("Max-Age=0"));

    // Garbage cookie: same silent outcome.
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, "refresh_token=not.a.token".parse().unwrap());
    let response = logout(State(state), headers).await.unwrap().into_response();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
