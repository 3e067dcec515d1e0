//! User identity and role authority.
//!
//! Registration inserts the user row and its empty profile row as one
//! transaction, so a crash between the two cannot leave a profile-less user.
//! Both promotion paths, "first user ever becomes admin" and the explicit
//! bootstrap endpoint, serialize on a Postgres advisory transaction lock:
//! the zero-admin check and the promotion commit atomically, so concurrent
//! callers cannot both observe an empty admin set and both win.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AuthError;

/// Advisory lock key shared by every code path that may mint an admin.
const ADMIN_BOOTSTRAP_LOCK_KEY: i64 = 0x666c_6565_7461_7574;

/// Authority level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Role::Admin),
            "driver" => Ok(Role::Driver),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}

/// A user row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    /// Globally unique login name.
    pub username: String,
    /// Globally unique email address.
    pub email: String,
    /// Opaque encoded hash; never serialized out of the store layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Stored as text; parse with [`User::role`].
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        // Rows can only hold values the CHECK constraint admits.
        Role::from_str(&self.role).unwrap_or(Role::Driver)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

/// Create a user and its empty profile atomically.
///
/// The first user ever registered becomes admin; everyone after is a driver.
/// Collisions on username or email fail `Conflict` naming the field, whether
/// detected by the pre-check or by the unique constraint at commit time.
pub async fn register(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    if let Some(existing) = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2"
    ))
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?
    {
        let field = if existing.username == username {
            "username"
        } else {
            "email"
        };
        return Err(AuthError::Conflict { field });
    }

    let password_hash = hash_password(password);

    let mut tx = pool.begin().await?;
    acquire_admin_lock(&mut tx).await?;

    let role = if count_admins(&mut tx).await? == 0 {
        Role::Admin
    } else {
        Role::Driver
    };

    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_unique_violation)?;

    sqlx::query("INSERT INTO user_profiles (id, user_id, updated_at) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.map_err(map_unique_violation)?;

    tracing::info!("registered user {} with role {}", user.username, user.role);
    Ok(user)
}

/// Look a user up by username or email, whichever matches.
pub async fn find_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<User>, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Assign `role` to the user with the given id.
///
/// Admin-only; the routing layer's admin gate enforces that, this function
/// trusts its caller.
pub async fn set_role_by_id(pool: &PgPool, user_id: Uuid, role: Role) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $1, updated_at = $2 WHERE id = $3 RETURNING {USER_COLUMNS}"
    ))
    .bind(role.as_str())
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::NotFound)
}

/// Assign `role` to the user with the given email.
pub async fn set_role_by_email(pool: &PgPool, email: &str, role: Role) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $1, updated_at = $2 WHERE email = $3 RETURNING {USER_COLUMNS}"
    ))
    .bind(role.as_str())
    .bind(Utc::now())
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::NotFound)
}

/// Promote the caller to admin, but only while no admin exists.
///
/// Succeeds for at most one caller system-wide: the admin count is checked
/// under the same advisory lock that registration's first-user promotion
/// takes, so two concurrent bootstraps cannot both see zero admins.
pub async fn bootstrap_admin(pool: &PgPool, caller_id: Uuid) -> Result<User, AuthError> {
    let mut tx = pool.begin().await?;
    acquire_admin_lock(&mut tx).await?;

    if count_admins(&mut tx).await? > 0 {
        return Err(AuthError::Forbidden);
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = 'admin', updated_at = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
    ))
    .bind(Utc::now())
    .bind(caller_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AuthError::NotFound)?;

    tx.commit().await?;

    tracing::info!("bootstrapped admin {}", user.username);
    Ok(user)
}

async fn acquire_admin_lock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<(), AuthError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ADMIN_BOOTSTRAP_LOCK_KEY)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn count_admins(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<i64, AuthError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(&mut **tx)
        .await?;
    Ok(count)
}

/// Translate unique-constraint violations into `Conflict` so a lost
/// registration race surfaces the same way the pre-check does.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            let field = match db_err.constraint() {
                Some(name) if name.contains("email") => "email",
                _ => "username",
            };
            return AuthError::Conflict { field };
        }
    }
    AuthError::Database(err)
}
