//! Refresh-session storage and lifecycle.
//!
//! One row is persisted per refresh token ever issued. A session is Active
//! until it is Rotated (revoked with `replaced_by` set) or Revoked by logout
//! (revoked alone); expiry is derived from `expires_at` at read time. Rows
//! are never deleted; revoked rows are what makes replay detectable.
//!
//! Rotation is a single transaction whose first step is a conditional
//! `UPDATE ... WHERE revoked = FALSE`. Two concurrent refreshes presenting
//! the same token race on that update: exactly one flips the flag and
//! commits a successor, the other matches zero rows and fails Unauthorized.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::auth::tokens::{TokenIssuer, TokenKind};
use crate::auth::users;
use crate::auth::users::User;
use crate::error::AuthError;

const SESSION_JTI_BYTES: usize = 16;

/// A refresh-session row. Immutable after insert except for `revoked` and
/// `replaced_by`, each set at most once.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshSession {
    pub id: Uuid,
    /// Token identifier embedded in the signed refresh token. Deliberately
    /// not the primary key, so external token identity stays decoupled from
    /// storage identity.
    pub jti: String,
    pub user_id: Uuid,
    pub revoked: bool,
    /// jti of the session that superseded this one at rotation.
    pub replaced_by: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Everything a caller needs to hand a fresh session to a client.
#[derive(Debug)]
pub struct OpenedSession {
    pub jti: String,
    pub refresh_token: String,
    /// Cookie Max-Age, seconds until the session expires.
    pub max_age_seconds: i64,
}

/// Access + refresh pair returned by login and refresh.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub max_age_seconds: i64,
}

fn new_session_jti() -> String {
    let mut bytes = [0u8; SESSION_JTI_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Persist a new Active session and mint the refresh token carrying its jti.
async fn open_session(
    tx: &mut Transaction<'_, Postgres>,
    issuer: &TokenIssuer,
    user_id: Uuid,
    ttl_days: i64,
) -> Result<OpenedSession, AuthError> {
    let now = Utc::now();
    let jti = new_session_jti();
    let expires_at = now + Duration::days(ttl_days);

    sqlx::query(
        "INSERT INTO refresh_sessions (id, jti, user_id, revoked, expires_at, created_at) \
         VALUES ($1, $2, $3, FALSE, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(&jti)
    .bind(user_id)
    .bind(expires_at)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    let refresh_token = issuer.mint_refresh_token(user_id, &jti, ttl_days)?;
    Ok(OpenedSession {
        jti,
        refresh_token,
        max_age_seconds: (expires_at - now).num_seconds(),
    })
}

pub async fn lookup_session(
    pool: &PgPool,
    jti: &str,
) -> Result<Option<RefreshSession>, AuthError> {
    let session = sqlx::query_as::<_, RefreshSession>(
        "SELECT id, jti, user_id, revoked, replaced_by, expires_at, created_at \
         FROM refresh_sessions WHERE jti = $1",
    )
    .bind(jti)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Idempotently mark a session revoked. Unknown jtis are a no-op.
pub async fn revoke_session(pool: &PgPool, jti: &str) -> Result<(), AuthError> {
    sqlx::query("UPDATE refresh_sessions SET revoked = TRUE WHERE jti = $1")
        .bind(jti)
        .execute(pool)
        .await?;
    Ok(())
}

/// Record which session superseded `old_jti`. Set exactly once, at rotation.
async fn link_rotation(
    tx: &mut Transaction<'_, Postgres>,
    old_jti: &str,
    new_jti: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE refresh_sessions SET replaced_by = $1 WHERE jti = $2")
        .bind(new_jti)
        .bind(old_jti)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Authenticate by username-or-email and open a new session.
///
/// Both an unknown identifier and a wrong password fail `InvalidCredentials`;
/// callers cannot tell them apart.
pub async fn login(
    pool: &PgPool,
    issuer: &TokenIssuer,
    identifier: &str,
    password: &str,
) -> Result<(User, SessionTokens), AuthError> {
    let user = users::find_by_identifier(pool, identifier)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        tracing::warn!("failed login for {identifier}");
        return Err(AuthError::InvalidCredentials);
    }

    let access_token = issuer.mint_access_token(user.id)?;

    let mut tx = pool.begin().await?;
    let opened = open_session(&mut tx, issuer, user.id, issuer.refresh_ttl_days()).await?;
    tx.commit().await?;

    tracing::info!("user {} logged in", user.username);
    Ok((
        user,
        SessionTokens {
            access_token,
            refresh_token: opened.refresh_token,
            max_age_seconds: opened.max_age_seconds,
        },
    ))
}

/// Rotate a refresh session: retire the presented one and issue a successor.
///
/// Fails `Unauthorized` when the token does not decode as a refresh token or
/// its session is missing, already rotated, revoked, or expired. The retire
/// step is a compare-and-swap on `revoked`, executed in the same transaction
/// that inserts the successor and links `replaced_by`, so a replayed or
/// concurrently-presented token observes the flipped flag and loses.
pub async fn refresh(
    pool: &PgPool,
    issuer: &TokenIssuer,
    refresh_token: &str,
) -> Result<SessionTokens, AuthError> {
    let claims = issuer
        .decode(refresh_token, TokenKind::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    let mut tx = pool.begin().await?;

    let now = Utc::now();
    let user_id: Option<Uuid> = sqlx::query_scalar(
        "UPDATE refresh_sessions SET revoked = TRUE \
         WHERE jti = $1 AND revoked = FALSE AND expires_at > $2 \
         RETURNING user_id",
    )
    .bind(&claims.jti)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    let user_id = user_id.ok_or_else(|| {
        tracing::warn!("refresh rejected for session {}", claims.jti);
        AuthError::Unauthorized
    })?;

    let opened = open_session(&mut tx, issuer, user_id, issuer.refresh_ttl_days()).await?;
    link_rotation(&mut tx, &claims.jti, &opened.jti).await?;

    tx.commit().await?;

    let access_token = issuer.mint_access_token(user_id)?;
    tracing::info!("rotated session {} -> {}", claims.jti, opened.jti);
    Ok(SessionTokens {
        access_token,
        refresh_token: opened.refresh_token,
        max_age_seconds: opened.max_age_seconds,
    })
}

/// Best-effort logout. A token that fails to decode is silently accepted
/// (the endpoint must not leak token validity), and revocation is
/// idempotent, so calling this twice with the same token never errors.
pub async fn logout(
    pool: &PgPool,
    issuer: &TokenIssuer,
    refresh_token: &str,
) -> Result<(), AuthError> {
    let claims = match issuer.decode(refresh_token, TokenKind::Refresh) {
        Ok(claims) => claims,
        Err(_) => return Ok(()),
    };
    revoke_session(pool, &claims.jti).await?;
    tracing::info!("revoked session {}", claims.jti);
    Ok(())
}
