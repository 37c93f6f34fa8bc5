use async_trait::async_trait;
use serde_json::Value;

use super::to_value;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::loom_client::LoomClient;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const USER_TOOLS: &[&str] = &["loom_test_connection", "loom_get_current_user"];

#[derive(Clone)]
pub struct UserManager {
    logger: Logger,
}

impl UserManager {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("user"),
        }
    }

    pub async fn handle_tool(
        &self,
        tool: &str,
        client: &LoomClient,
        _args: Value,
    ) -> Result<Value, ToolError> {
        match tool {
            "loom_test_connection" => {
                let status = client.test_connection().await;
                if !status.connected {
                    self.logger.info(
                        "connection check failed",
                        Some(&serde_json::json!({"reason": status.message})),
                    );
                }
                to_value(&status)
            }
            "loom_get_current_user" => to_value(&client.get_current_user().await?),
            _ => Err(unknown_tool_error(tool, USER_TOOLS)),
        }
    }
}

#[async_trait]
impl ToolHandler for UserManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
