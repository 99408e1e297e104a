use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx answer carrying the server's `{ error, details? }` body.
    #[error("{error}")]
    Api {
        status: StatusCode,
        error: String,
        details: Option<String>,
    },

    #[error("session expired: {0}")]
    SessionExpired(String),

    #[error("no authentication token stored")]
    MissingToken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email not verified, check your inbox")]
    EmailNotVerified,

    #[error("unexpected response: {0}")]
    Parse(String),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Invalid(String),

    #[error("credential storage: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::SessionExpired(_) | ClientError::InvalidCredentials => {
                Some(StatusCode::UNAUTHORIZED)
            }
            ClientError::EmailNotVerified => Some(StatusCode::FORBIDDEN),
            _ => None,
        }
    }
}

/// Error body every endpoint returns.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub details: Option<String>,
}
