//! Fleetgate - Credential & Session Service
//!
//! Fleetgate is the authentication backbone of a fleet-management platform:
//! it issues credentials, tracks refresh-session lifecycles, and manages the
//! admin/driver role authority that the fleet CRUD services rely on.
//!
//! # Overview
//!
//! The library provides:
//! - Password hashing with per-call salts and timing-safe verification
//! - Signed access and refresh tokens (JWT, shared-secret HMAC)
//! - Server-side refresh-session tracking with rotation and revocation,
//!   where replaying a rotated token always fails
//! - Role management with a race-safe one-time admin bootstrap
//! - Atomic user + profile registration over PostgreSQL
//!
//! # Module Structure
//!
//! - **`auth`** - the core components and their HTTP handlers
//! - **`server`** - configuration, application state, startup
//! - **`routes`** - router assembly
//! - **`middleware`** - bearer-token authentication and the admin gate
//! - **`error`** - the subsystem's error taxonomy
//!
//! # State Management
//!
//! All shared state lives in [`server::state::AppState`]: the connection
//! pool, the token issuer, and the parsed configuration. There are no
//! process-wide mutable registries; every component receives what it needs
//! through state injection. Cross-request invariants (session rotation,
//! admin bootstrap, user+profile creation) are enforced by PostgreSQL
//! transactions, not in-memory locks.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;

pub use auth::{Role, TokenIssuer, User};
pub use error::AuthError;
pub use server::{create_app, AppConfig, AppState};
