//! # om-auth
//!
//! Caller resolution for the outcome mapping service.
//!
//! Provides deterministic API key derivation (HMAC-SHA256 over the user id),
//! salted password verification for login, the in-process session cache, and
//! the [`Guard`] that turns an API key into an [`AuthContext`] under an
//! [`Access`] policy.

pub mod api_key;
pub mod error;
pub mod guard;
pub mod password;
pub mod session;

pub use api_key::derive_api_key;
pub use error::AuthError;
pub use guard::{Access, AuthContext, Directory, Guard, Scope};
pub use session::SessionCache;
