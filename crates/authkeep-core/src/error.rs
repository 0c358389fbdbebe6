use thiserror::Error;

use crate::store::StorageError;

/// Failures surfaced by the gateway and the session controller.
///
/// Every variant carries a message that can be shown to the user as-is.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The API rejected the request, or it never reached the API.
    #[error("{message}")]
    AuthFailure {
        message: String,
        /// HTTP status when the API answered.
        status: Option<u16>,
        /// Underlying cause, for logs only.
        cause: String,
    },

    #[error("{message}")]
    NoRefreshToken { message: String },

    #[error("{message}")]
    PasswordMismatch { message: String },

    #[error("Token storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("{message}")]
    LogoutFailure {
        message: String,
        #[source]
        source: StorageError,
    },
}

impl AuthError {
    /// True if the API answered 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::AuthFailure { status: Some(401), .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::AuthFailure { status, .. } => *status,
            _ => None,
        }
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
