use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{parse_args, require_id, to_value, PageArgs};
use crate::config::Config;
use crate::errors::ToolError;
use crate::services::loom_client::LoomClient;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const WORKSPACE_TOOLS: &[&str] = &["loom_list_workspaces", "loom_get_workspace"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceArgs {
    workspace_id: String,
}

#[derive(Clone)]
pub struct WorkspaceManager {
    config: Arc<Config>,
}

impl WorkspaceManager {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub async fn handle_tool(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        match tool {
            "loom_list_workspaces" => {
                let page: PageArgs = parse_args(tool, args)?;
                to_value(&client.list_workspaces(&page.to_params(&self.config)).await?)
            }
            "loom_get_workspace" => {
                let args: WorkspaceArgs = parse_args(tool, args)?;
                let id = require_id("workspaceId", &args.workspace_id)?;
                to_value(&client.get_workspace(id).await?)
            }
            _ => Err(unknown_tool_error(tool, WORKSPACE_TOOLS)),
        }
    }
}

#[async_trait]
impl ToolHandler for WorkspaceManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
