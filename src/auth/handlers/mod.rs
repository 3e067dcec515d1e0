//! HTTP handlers for the auth endpoints.

pub mod cookies;
pub mod login;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod roles;
pub mod types;

pub use login::login;
pub use profile::{get_me, get_profile, update_profile};
pub use refresh::{logout, refresh};
pub use register::register;
pub use roles::{bootstrap_admin, set_role_by_email, set_role_by_id};
