use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{mutation_result, parse_args, require_id, to_value, PageArgs};
use crate::config::Config;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::loom_client::LoomClient;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const SPACE_TOOLS: &[&str] = &[
    "loom_list_spaces",
    "loom_get_space",
    "loom_list_space_videos",
    "loom_add_video_to_space",
    "loom_remove_video_from_space",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceArgs {
    space_id: String,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceIdArgs {
    space_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceVideoArgs {
    space_id: String,
    video_id: String,
}

#[derive(Clone)]
pub struct SpaceManager {
    logger: Logger,
    config: Arc<Config>,
}

impl SpaceManager {
    pub fn new(logger: Logger, config: Arc<Config>) -> Self {
        Self {
            logger: logger.child("spaces"),
            config,
        }
    }

    pub async fn handle_tool(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        match tool {
            "loom_list_spaces" => {
                let page: PageArgs = parse_args(tool, args)?;
                to_value(&client.list_spaces(&page.to_params(&self.config)).await?)
            }
            "loom_get_space" => {
                let args: SpaceIdArgs = parse_args(tool, args)?;
                let id = require_id("spaceId", &args.space_id)?;
                to_value(&client.get_space(id).await?)
            }
            "loom_list_space_videos" => {
                let args: SpaceArgs = parse_args(tool, args)?;
                let id = require_id("spaceId", &args.space_id)?;
                let page = args.page.to_params(&self.config);
                to_value(&client.list_space_videos(id, &page).await?)
            }
            "loom_add_video_to_space" | "loom_remove_video_from_space" => {
                let args: SpaceVideoArgs = parse_args(tool, args)?;
                let space_id = require_id("spaceId", &args.space_id)?;
                let video_id = require_id("videoId", &args.video_id)?;
                let meta = serde_json::json!({"space_id": space_id, "video_id": video_id});
                let message = if tool == "loom_add_video_to_space" {
                    client.add_video_to_space(space_id, video_id).await?;
                    self.logger.info("video added to space", Some(&meta));
                    "Video added to space successfully"
                } else {
                    client.remove_video_from_space(space_id, video_id).await?;
                    self.logger.info("video removed from space", Some(&meta));
                    "Video removed from space successfully"
                };
                mutation_result::<Value>(message, "space", None)
            }
            _ => Err(unknown_tool_error(tool, SPACE_TOOLS)),
        }
    }
}

#[async_trait]
impl ToolHandler for SpaceManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
