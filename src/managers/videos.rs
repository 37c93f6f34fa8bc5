use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{mutation_result, parse_args, require_id, to_value, PageArgs};
use crate::config::Config;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::loom_client::{EmbedOptions, LoomClient};
use crate::services::models::VideoUpdate;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const VIDEO_TOOLS: &[&str] = &[
    "loom_list_videos",
    "loom_get_video",
    "loom_update_video",
    "loom_delete_video",
    "loom_search_videos",
    "loom_duplicate_video",
    "loom_move_video_to_folder",
    "loom_get_transcript",
    "loom_get_video_analytics",
    "loom_get_embed_html",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoArgs {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateVideoArgs {
    video_id: String,
    #[serde(flatten)]
    update: VideoUpdate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: String,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveArgs {
    video_id: String,
    folder_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbedArgs {
    video_id: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    autoplay: bool,
}

#[derive(Clone)]
pub struct VideoManager {
    logger: Logger,
    config: Arc<Config>,
}

impl VideoManager {
    pub fn new(logger: Logger, config: Arc<Config>) -> Self {
        Self {
            logger: logger.child("videos"),
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
            "loom_list_videos" => {
                let page: PageArgs = parse_args(tool, args)?;
                to_value(&client.list_videos(&page.to_params(&self.config)).await?)
            }
            "loom_get_video" => {
                let args: VideoArgs = parse_args(tool, args)?;
                let id = require_id("videoId", &args.video_id)?;
                to_value(&client.get_video(id).await?)
            }
            "loom_update_video" => self.update_video(tool, client, args).await,
            "loom_delete_video" => {
                let args: VideoArgs = parse_args(tool, args)?;
                let id = require_id("videoId", &args.video_id)?;
                client.delete_video(id).await?;
                self.logger
                    .info("video deleted", Some(&serde_json::json!({"video_id": id})));
                mutation_result::<Value>("Video deleted successfully", "video", None)
            }
            "loom_search_videos" => {
                let args: SearchArgs = parse_args(tool, args)?;
                let query = args.query.trim();
                if query.is_empty() {
                    return Err(ToolError::invalid_params("query must be a non-empty string"));
                }
                to_value(
                    &client
                        .search_videos(query, &args.page.to_params(&self.config))
                        .await?,
                )
            }
            "loom_duplicate_video" => {
                let args: VideoArgs = parse_args(tool, args)?;
                let id = require_id("videoId", &args.video_id)?;
                let copy = client.duplicate_video(id).await?;
                mutation_result("Video duplicated successfully", "video", copy)
            }
            "loom_move_video_to_folder" => {
                let args: MoveArgs = parse_args(tool, args)?;
                let video_id = require_id("videoId", &args.video_id)?;
                let folder_id = require_id("folderId", &args.folder_id)?;
                let video = client.move_video_to_folder(video_id, folder_id).await?;
                mutation_result(
                    &format!("Video moved to folder {}", folder_id),
                    "video",
                    video,
                )
            }
            "loom_get_transcript" => {
                let args: VideoArgs = parse_args(tool, args)?;
                let id = require_id("videoId", &args.video_id)?;
                to_value(&client.get_transcript(id).await?)
            }
            "loom_get_video_analytics" => {
                let args: VideoArgs = parse_args(tool, args)?;
                let id = require_id("videoId", &args.video_id)?;
                to_value(&client.get_video_analytics(id).await?)
            }
            "loom_get_embed_html" => {
                let args: EmbedArgs = parse_args(tool, args)?;
                let id = require_id("videoId", &args.video_id)?;
                let options = EmbedOptions {
                    width: args.width,
                    height: args.height,
                    autoplay: args.autoplay,
                };
                to_value(&client.get_embed_html(id, options).await?)
            }
            _ => Err(unknown_tool_error(tool, VIDEO_TOOLS)),
        }
    }

    async fn update_video(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        let args: UpdateVideoArgs = parse_args(tool, args)?;
        let id = require_id("videoId", &args.video_id)?;
        if args.update == VideoUpdate::default() {
            return Err(ToolError::invalid_params(
                "Provide at least one of title, description, privacy or folderId",
            ));
        }
        let video = client.update_video(id, &args.update).await?;
        mutation_result("Video updated successfully", "video", video)
    }
}

#[async_trait]
impl ToolHandler for VideoManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
