use om_auth::AuthError;
use om_core::errors::CoreError;
use om_core::responses::{MESSAGE_PERMISSION_DENIED, Status};
use om_db::error::DatabaseError;
use thiserror::Error;

/// Every failure a request can end in, before it becomes an envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request line could not be decoded.
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Auth(AuthError::NotAuthenticated | AuthError::InvalidCredentials) => {
                Status::Unauthorized
            }
            Self::Auth(AuthError::PermissionDenied) => Status::Forbidden,
            Self::Auth(AuthError::NotFound { .. })
            | Self::Database(DatabaseError::NotFound { .. })
            | Self::Core(CoreError::NotFound { .. }) => Status::NotFound,
            Self::Database(DatabaseError::Validation(_))
            | Self::Core(CoreError::Validation(_))
            | Self::BadRequest(_) => Status::BadRequest,
            Self::Database(DatabaseError::Conflict(_)) => Status::Conflict,
            Self::Auth(AuthError::KeyDerivation(_) | AuthError::Directory(_))
            | Self::Database(_)
            | Self::Core(CoreError::Other(_))
            | Self::Encode(_) => Status::InternalError,
        }
    }

    /// Message placed in the response envelope.
    ///
    /// Store and internal failures are reported generically; their detail
    /// goes to the log.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Auth(AuthError::PermissionDenied) => MESSAGE_PERMISSION_DENIED.to_string(),
            Self::Auth(AuthError::InvalidCredentials) => "login failed".to_string(),
            _ if self.status() == Status::InternalError => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}
