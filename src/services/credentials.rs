use serde_json::Value;
use std::collections::HashMap;

use crate::constants::headers;
use crate::errors::ApiError;

/// Header-like metadata attached to one inbound tool call.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    headers: HashMap<String, String>,
}

impl RequestMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Reads `params._meta.headers` of a `tools/call` request. Non-string
    /// values are ignored.
    pub fn from_call_params(params: &Value) -> Self {
        let mut meta = Self::new();
        let Some(map) = params
            .get("_meta")
            .and_then(|m| m.get("headers"))
            .and_then(|h| h.as_object())
        else {
            return meta;
        };
        for (name, value) in map {
            if let Some(text) = value.as_str() {
                meta = meta.with_header(name, text);
            }
        }
        meta
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Per-call tenant credentials. Lives for exactly one operation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TenantCredentials {
    pub access_token: Option<String>,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for TenantCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantCredentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TenantCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn require_token(&self) -> Result<&str, ApiError> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(ApiError::missing_token)
    }
}

/// Pulls the access token and optional base-URL override out of the
/// request metadata. Pure; presence of the token is checked later.
pub fn resolve_credentials(meta: &RequestMeta) -> TenantCredentials {
    TenantCredentials {
        access_token: meta.header(headers::ACCESS_TOKEN).map(str::to_string),
        base_url: meta
            .header(headers::BASE_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty()),
    }
}
