use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{mutation_result, parse_args, to_value};
use crate::errors::ToolError;
use crate::services::loom_client::LoomClient;
use crate::services::models::NewRecordLink;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const SHARING_TOOLS: &[&str] = &["loom_get_oembed", "loom_create_record_link"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OEmbedArgs {
    url: String,
    #[serde(default)]
    max_width: Option<u32>,
    #[serde(default)]
    max_height: Option<u32>,
}

/// oEmbed lookups and record links.
#[derive(Clone, Default)]
pub struct SharingManager;

impl SharingManager {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle_tool(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        match tool {
            "loom_get_oembed" => {
                let args: OEmbedArgs = parse_args(tool, args)?;
                let url = args.url.trim();
                if url.is_empty() {
                    return Err(ToolError::invalid_params("url must be a non-empty string"));
                }
                to_value(
                    &client
                        .get_oembed(url, args.max_width, args.max_height)
                        .await?,
                )
            }
            "loom_create_record_link" => {
                let link: NewRecordLink = parse_args(tool, args)?;
                let created = client.create_record_link(&link).await?;
                mutation_result("Record link created successfully", "recordLink", created)
            }
            _ => Err(unknown_tool_error(tool, SHARING_TOOLS)),
        }
    }
}

#[async_trait]
impl ToolHandler for SharingManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
