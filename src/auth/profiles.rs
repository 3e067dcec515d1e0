//! User profile storage.
//!
//! A profile is a separate row keyed by `user_id` (unique, cascade-deleted
//! with its user); ownership is expressed as a lookup by id, not an
//! in-memory back-pointer. The row is created empty at registration and
//! filled in by partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address_line: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a profile update may touch. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address_line: Option<String>,
}

const PROFILE_COLUMNS: &str =
    "id, user_id, first_name, last_name, phone_number, address_line, updated_at";

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, AuthError> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::NotFound)
}

/// Apply a partial update, creating the row if the account predates
/// automatic profile creation.
pub async fn upsert_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: ProfileUpdate,
) -> Result<UserProfile, AuthError> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!(
        "INSERT INTO user_profiles \
           (id, user_id, first_name, last_name, phone_number, address_line, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id) DO UPDATE SET \
           first_name = COALESCE($3, user_profiles.first_name), \
           last_name = COALESCE($4, user_profiles.last_name), \
           phone_number = COALESCE($5, user_profiles.phone_number), \
           address_line = COALESCE($6, user_profiles.address_line), \
           updated_at = $7 \
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(update.first_name)
    .bind(update.last_name)
    .bind(update.phone_number)
    .bind(update.address_line)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(profile)
}
