use thiserror::Error;

use crate::constants::messages;

/// Failure of a single call against the remote video API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded. Retry after {retry_after_secs} seconds.")]
    RateLimit { retry_after_secs: u64 },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request to Loom API failed: {message}")]
    Transport { message: String, timed_out: bool },

    #[error("Unexpected response from Loom API: {message}")]
    Decode { message: String },

    #[error("{message}")]
    InvalidRequest { message: String },
}

impl ApiError {
    pub fn missing_token() -> Self {
        Self::Authentication {
            message: messages::MISSING_TOKEN.to_string(),
        }
    }

    pub fn rejected_token() -> Self {
        Self::Authentication {
            message: messages::AUTH_FAILED.to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound {
            message: messages::NOT_FOUND.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::RateLimit { .. } => "RATE_LIMIT_EXCEEDED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Api { .. } => "API_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode {
                message: err.to_string(),
            };
        }
        Self::Transport {
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}
