//! Error types for the session layer.

use thiserror::Error;

/// Failures reading or writing a token storage scope.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid json: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    AccountExists,

    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How a failure should be treated at the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad login or registration input; shown to the user, state unchanged.
    Credential,
    /// Stale or missing token; cleared silently.
    SessionExpiry,
    /// Anything else; surfaced like a credential error.
    Unexpected,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidCredentials
            | SessionError::AccountExists
            | SessionError::Validation(_) => ErrorKind::Credential,
            SessionError::Unauthorized | SessionError::SessionExpired => ErrorKind::SessionExpiry,
            SessionError::Api { .. } | SessionError::Network(_) | SessionError::Storage(_) => {
                ErrorKind::Unexpected
            }
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::Network(err.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
pub type StorageResult<T> = Result<T, StorageError>;
