//! Subsystem error taxonomy.
//!
//! Every failure the credential/session subsystem can produce is a distinct,
//! stable kind so the HTTP layer maps errors to responses without inspecting
//! message text. Store-level integrity violations detected at commit time are
//! translated to `Conflict` before they reach a caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::auth::tokens::TokenError;

/// All error kinds surfaced by the authentication subsystem.
///
/// None of these are retried automatically; each is terminal for the request
/// that produced it.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad identifier or password at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Duplicate username or email at registration. `field` names the
    /// column that collided.
    #[error("{field} already exists")]
    Conflict { field: &'static str },

    /// Missing, invalid, expired, or revoked token.
    #[error("unauthorized")]
    Unauthorized,

    /// Unknown user or session.
    #[error("not found")]
    NotFound,

    /// Role string outside the allowed set.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Bootstrap attempted when an admin already exists, or a non-admin
    /// attempting an admin-only action.
    #[error("forbidden")]
    Forbidden,

    /// Token minting or decoding failure. Surfaced to HTTP as 401.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Unexpected store failure. Unique violations are mapped to `Conflict`
    /// at the query sites and never reach this variant.
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// HTTP status code for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidRole(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients.
    fn public_message(&self) -> String {
        match self {
            // Store faults carry connection details; clients get a flat 500.
            Self::Database(_) => "internal server error".to_string(),
            Self::Token(_) => "unauthorized".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Database(err) = &self {
            tracing::error!("database error: {err}");
        }
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
