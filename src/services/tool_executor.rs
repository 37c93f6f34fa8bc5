use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::errors::{ToolError, ToolErrorKind};
use crate::services::credentials::{resolve_credentials, RequestMeta};
use crate::services::logger::Logger;
use crate::services::loom_client::LoomClient;
use crate::utils::text::limit_response_text;
use crate::utils::tool_errors::unknown_tool_error;

/// One group of tools. `client` is already bound to the caller's credentials.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, tool: &str, client: &LoomClient, args: Value)
        -> Result<Value, ToolError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Content envelope handed back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResponse {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text,
            }],
            is_error,
        }
    }

    pub fn success(result: &Value, character_limit: usize) -> Result<Self, ToolError> {
        let rendered = serde_json::to_string_pretty(result)?;
        Ok(Self::text(
            limit_response_text(rendered, character_limit),
            false,
        ))
    }

    pub fn failure(error: &ToolError) -> Self {
        Self::text(format!("Error: {}", error.message), true)
    }

    pub fn first_text(&self) -> &str {
        self.content
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    config: Arc<Config>,
    http: Client,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        config: Arc<Config>,
        http: Client,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            config,
            http,
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_handler(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs one tool call. Only an unknown tool name is an `Err`; every
    /// failure inside the handler comes back as an error envelope.
    pub async fn execute(
        &self,
        tool: &str,
        args: Value,
        meta: &RequestMeta,
    ) -> Result<ToolResponse, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            return Err(unknown_tool_error(tool, self.tool_names().as_slice()));
        };
        let call_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let credentials = resolve_credentials(meta);
        let client = LoomClient::new(
            &self.logger,
            self.http.clone(),
            credentials,
            &self.config.default_base_url,
        );
        self.logger.debug(
            "tool call",
            Some(&serde_json::json!({"tool": tool, "call_id": call_id})),
        );

        let outcome = match handler.handle(tool, &client, args).await {
            Ok(result) => ToolResponse::success(&result, self.config.character_limit),
            Err(err) => Err(err),
        };
        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                let meta = serde_json::json!({
                    "tool": tool,
                    "call_id": call_id,
                    "kind": err.kind,
                    "code": err.code,
                });
                if err.kind == ToolErrorKind::Internal {
                    self.logger.error("tool call failed", Some(&meta));
                } else {
                    self.logger.warn("tool call failed", Some(&meta));
                }
                ToolResponse::failure(&err)
            }
        };
        self.logger.debug(
            "tool call finished",
            Some(&serde_json::json!({
                "tool": tool,
                "call_id": call_id,
                "is_error": response.is_error,
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;

    #[test]
    fn success_envelope_is_pretty_json() {
        let response =
            ToolResponse::success(&serde_json::json!({"id": "v1"}), 1000).unwrap();
        assert!(!response.is_error);
        assert_eq!(response.first_text(), "{\n  \"id\": \"v1\"\n}");
        let out = serde_json::to_value(&response).unwrap();
        assert_eq!(out["content"][0]["type"], "text");
        assert!(out.get("isError").is_none());
    }

    #[test]
    fn success_envelope_respects_character_limit() {
        let long = serde_json::json!({"text": "x".repeat(200)});
        let response = ToolResponse::success(&long, 50).unwrap();
        assert!(response.first_text().contains("[Response truncated at 50 characters."));
    }

    #[test]
    fn failure_envelope_prefixes_error() {
        let err: ToolError = ApiError::not_found().into();
        let response = ToolResponse::failure(&err);
        assert!(response.is_error);
        assert_eq!(response.first_text(), "Error: Resource not found");
        let out = serde_json::to_value(&response).unwrap();
        assert_eq!(out["isError"], true);
    }
}
