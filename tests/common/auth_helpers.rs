//! Authentication test helpers
//!
//! Provides utilities for creating test users, issuing tokens, and driving
//! authentication flows.

use jsonwebtoken::Algorithm;
use sqlx::PgPool;
use uuid::Uuid;

use fleetgate::auth::tokens::TokenIssuer;
use fleetgate::auth::users;
use fleetgate::auth::users::User;
use fleetgate::server::config::AppConfig;

pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Token issuer configured like the test server.
pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new("integration-test-secret", Algorithm::HS256, 60, 30)
}

/// Configuration matching [`test_issuer`], for handler-level tests.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        jwt_secret: "integration-test-secret".to_string(),
        jwt_algorithm: Algorithm::HS256,
        access_token_ttl_minutes: 60,
        refresh_token_ttl_days: 30,
        admin_emails: Vec::new(),
        port: 0,
    }
}

/// Register a user through the real registration path.
pub async fn register_test_user(pool: &PgPool, username: &str, email: &str) -> User {
    users::register(pool, username, email, TEST_PASSWORD)
        .await
        .expect("Failed to register test user")
}

/// Register a user with generated unique credentials.
pub async fn register_unique_test_user(pool: &PgPool) -> User {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("user_{}", &suffix[..12]);
    let email = format!("{username}@example.com");
    register_test_user(pool, &username, &email).await
}

/// Authorization header value for a token.
pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}
