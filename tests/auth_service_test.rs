//! Integration tests for registration, login, roles, and profiles.
//!
//! These run against the database named by DATABASE_URL and truncate it
//! between tests, so the whole suite is serialized.

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serial_test::serial;
use uuid::Uuid;

use fleetgate::auth::users::{self, Role};
use fleetgate::auth::{profiles, sessions};
use fleetgate::error::AuthError;

use common::auth_helpers::{
    register_test_user, register_unique_test_user, test_issuer, TEST_PASSWORD,
};
use common::database::TestDatabase;

#[tokio::test]
#[serial]
async fn test_register_and_duplicates() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    let created = register_test_user(pool, "u1", "u1@example.com").await;
    assert_eq!(created.username, "u1");
    assert_eq!(created.email, "u1@example.com");
    // The stored hash is encoded, never the plain secret.
    assert!(created.password_hash.starts_with("sha256$"));

    let dup_username = users::register(pool, "u1", "another@example.com", "pw").await;
    assert_matches!(dup_username, Err(AuthError::Conflict { field: "username" }));

    let dup_email = users::register(pool, "another", "u1@example.com", "pw").await;
    assert_matches!(dup_email, Err(AuthError::Conflict { field: "email" }));
}

#[tokio::test]
#[serial]
async fn test_first_user_is_admin_second_is_driver() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    let first = register_test_user(pool, "first", "first@example.com").await;
    assert_eq!(first.role(), Role::Admin);

    let second = register_test_user(pool, "second", "second@example.com").await;
    assert_eq!(second.role(), Role::Driver);
}

#[tokio::test]
#[serial]
async fn test_login_by_username_or_email() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let issuer = test_issuer();

    let created = register_test_user(pool, "alice", "alice@x.com").await;

    let (user, tokens) = sessions::login(pool, &issuer, "alice@x.com", TEST_PASSWORD)
        .await
        .expect("login by email failed");
    assert_eq!(user.id, created.id);
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
    assert!(tokens.max_age_seconds > 0);

    let (user, _) = sessions::login(pool, &issuer, "alice", TEST_PASSWORD)
        .await
        .expect("login by username failed");
    assert_eq!(user.id, created.id);
}

#[tokio::test]
#[serial]
async fn test_login_rejects_bad_credentials() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let issuer = test_issuer();

    register_test_user(pool, "alice", "alice@x.com").await;

    let wrong_password = sessions::login(pool, &issuer, "alice@x.com", "wrong").await;
    assert_matches!(wrong_password, Err(AuthError::InvalidCredentials));

    let unknown = sessions::login(pool, &issuer, "nobody@x.com", TEST_PASSWORD).await;
    assert_matches!(unknown, Err(AuthError::InvalidCredentials));
}

#[tokio::test]
#[serial]
async fn test_bootstrap_admin_once() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    let first = register_unique_test_user(pool).await;
    let second = register_unique_test_user(pool).await;

    // With the first user demoted there is no admin left to bootstrap from.
    users::set_role_by_id(pool, first.id, Role::Driver)
        .await
        .unwrap();

    let promoted = users::bootstrap_admin(pool, second.id)
        .await
        .expect("bootstrap with zero admins should succeed");
    assert_eq!(promoted.role(), Role::Admin);

    // A second bootstrap finds an admin and is refused.
    let refused = users::bootstrap_admin(pool, first.id).await;
    assert_matches!(refused, Err(AuthError::Forbidden));
}

#[tokio::test]
#[serial]
async fn test_bootstrap_admin_unknown_caller() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    let result = users::bootstrap_admin(pool, Uuid::new_v4()).await;
    assert_matches!(result, Err(AuthError::NotFound));
}

#[tokio::test]
#[serial]
async fn test_set_role() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    register_unique_test_user(pool).await;
    let target = register_unique_test_user(pool).await;
    assert_eq!(target.role(), Role::Driver);

    let updated = users::set_role_by_id(pool, target.id, Role::Admin)
        .await
        .unwrap();
    assert_eq!(updated.role(), Role::Admin);

    let updated = users::set_role_by_email(pool, &target.email, Role::Driver)
        .await
        .unwrap();
    assert_eq!(updated.role(), Role::Driver);

    let missing = users::set_role_by_id(pool, Uuid::new_v4(), Role::Admin).await;
    assert_matches!(missing, Err(AuthError::NotFound));

    let missing = users::set_role_by_email(pool, "ghost@example.com", Role::Admin).await;
    assert_matches!(missing, Err(AuthError::NotFound));
}

#[tokio::test]
#[serial]
async fn test_profile_created_with_user_and_updated_partially() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    let user = register_unique_test_user(pool).await;

    let profile = profiles::get_profile(pool, user.id)
        .await
        .expect("registration should have created an empty profile");
    assert_eq!(profile.user_id, user.id);
    assert_eq!(profile.first_name, None);
    assert_eq!(profile.phone_number, None);

    let update = profiles::ProfileUpdate {
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
        ..Default::default()
    };
    let profile = profiles::upsert_profile(pool, user.id, update).await.unwrap();
    assert_eq!(profile.first_name.as_deref(), Some("Ada"));

    // A later partial update leaves previously set fields alone.
    let update = profiles::ProfileUpdate {
        phone_number: Some("+3550000000".to_string()),
        ..Default::default()
    };
    let profile = profiles::upsert_profile(pool, user.id, update).await.unwrap();
    assert_eq!(profile.first_name.as_deref(), Some("Ada"));
    assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    assert_eq!(profile.phone_number.as_deref(), Some("+3550000000"));

    let missing = profiles::get_profile(pool, Uuid::new_v4()).await;
    assert_matches!(missing, Err(AuthError::NotFound));
}
