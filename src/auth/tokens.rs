//! Signed token minting and decoding.
//!
//! A `TokenIssuer` is constructed once at startup from configuration and
//! injected through application state; nothing in this module reads ambient
//! globals. Access tokens carry `{sub, iat, exp, jti}` and are never
//! individually revocable; revocation is achieved only by letting them
//! expire. Refresh tokens additionally carry `typ = "refresh"` and their
//! `jti` names the server-side session row.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Marker distinguishing refresh tokens from access tokens in the `typ`
/// claim.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Decoding failures, one kind per §7 taxonomy entry so callers branch on
/// kind instead of catching a generic error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is expired")]
    Expired,
    #[error("token is of the wrong type")]
    WrongType,
    #[error("token is malformed")]
    Malformed,
}

/// Which kind of token a decode expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token this issuer mints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Token identifier. For refresh tokens this is the session identifier;
    /// for access tokens it is random and unused for revocation.
    pub jti: String,
    /// Type discriminator; present only on refresh tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// Mints and decodes signed tokens with one process-wide secret and
/// algorithm, both supplied at construction.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    algorithm: Algorithm,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(
        secret: &str,
        algorithm: Algorithm,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            algorithm,
            access_ttl_minutes,
            refresh_ttl_days,
        }
    }

    /// Default refresh-session lifetime in days.
    pub fn refresh_ttl_days(&self) -> i64 {
        self.refresh_ttl_days
    }

    /// Mint a short-lived access token for `user_id`.
    pub fn mint_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_ttl_minutes)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: None,
        };
        self.sign(&claims)
    }

    /// Mint a refresh token bound to the session identified by `session_jti`.
    pub fn mint_refresh_token(
        &self,
        user_id: Uuid,
        session_jti: &str,
        ttl_days: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(ttl_days)).timestamp(),
            jti: session_jti.to_string(),
            typ: Some(REFRESH_TOKEN_TYPE.to_string()),
        };
        self.sign(&claims)
    }

    /// Verify signature and expiry, then check the type discriminator.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let validation = Validation::new(self.algorithm);
        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        let claims = data.claims;
        let matches = match expected {
            TokenKind::Refresh => claims.typ.as_deref() == Some(REFRESH_TOKEN_TYPE),
            TokenKind::Access => claims.typ.is_none(),
        };
        if !matches {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(
            &Header::new(self.algorithm),
            claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|_| TokenError::Malformed)
    }
}
