//! Error types for the credential and session subsystem.

pub mod types;

pub use types::AuthError;
