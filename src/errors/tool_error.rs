use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

use super::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Denied,
    NotFound,
    Timeout,
    Retryable,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, ToolErrorKind::Timeout | ToolErrorKind::Retryable),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<ApiError> for ToolError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        let code = err.code();
        match err {
            ApiError::Authentication { .. } => ToolError::new(ToolErrorKind::Denied, code, message)
                .with_hint("Send a valid token in the x-loom-access-token header."),
            ApiError::RateLimit { retry_after_secs } => {
                ToolError::new(ToolErrorKind::Retryable, code, message)
                    .with_details(serde_json::json!({ "retry_after": retry_after_secs }))
            }
            ApiError::NotFound { .. } => ToolError::new(ToolErrorKind::NotFound, code, message),
            ApiError::Api { status, .. } => ToolError::new(ToolErrorKind::Internal, code, message)
                .with_details(serde_json::json!({ "status": status })),
            ApiError::Transport { timed_out, .. } => {
                let kind = if timed_out {
                    ToolErrorKind::Timeout
                } else {
                    ToolErrorKind::Retryable
                };
                ToolError::new(kind, code, message)
            }
            ApiError::Decode { .. } => ToolError::new(ToolErrorKind::Internal, code, message),
            ApiError::InvalidRequest { .. } => {
                ToolError::new(ToolErrorKind::InvalidParams, code, message)
            }
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::internal(format!("Failed to serialize result: {}", err))
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(format!("I/O error: {}", err))
    }
}
