//! Error taxonomy of the platform client.

use thiserror::Error;
use validator::ValidationErrors;

/// Backend codes attached to 401 responses that must not trigger a refresh.
pub mod codes {
    pub const EMAIL_NOT_VERIFIED: &str = "EMAIL_NOT_VERIFIED";
    pub const NO_REFRESH_TOKEN: &str = "NO_REFRESH_TOKEN";
    pub const REFRESH_FAILED: &str = "REFRESH_FAILED";
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// No HTTP response at all (DNS, connect, timeout, TLS).
    #[error("Network error: {0}")]
    Transport(String),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The silent token refresh this request was waiting on failed.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Form input rejected before anything was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Coarse class of a failure, used to pick how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Network,
    AuthTerminal,
    Unauthorized,
    Validation,
    Client,
    Server,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Transport(_) => ErrorClass::Network,
            ClientError::RefreshFailed(_) => ErrorClass::AuthTerminal,
            ClientError::Validation(_) => ErrorClass::Validation,
            ClientError::Decode(_) => ErrorClass::Server,
            ClientError::InvalidRequest(_) => ErrorClass::Client,
            ClientError::Api { status, code, .. } => match (*status, code.as_deref()) {
                (
                    401,
                    Some(
                        codes::EMAIL_NOT_VERIFIED | codes::NO_REFRESH_TOKEN | codes::REFRESH_FAILED,
                    ),
                ) => ErrorClass::AuthTerminal,
                (401, _) => ErrorClass::Unauthorized,
                (s, _) if s >= 500 => ErrorClass::Server,
                _ => ErrorClass::Client,
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
