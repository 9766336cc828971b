use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("user directory error: {0}")]
    Directory(String),
}
