use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{mutation_result, parse_args, require_id, to_value, PageArgs};
use crate::config::Config;
use crate::errors::ToolError;
use crate::services::loom_client::LoomClient;
use crate::services::models::NewComment;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const COMMENT_TOOLS: &[&str] = &["loom_list_comments", "loom_create_comment"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCommentsArgs {
    video_id: String,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentArgs {
    video_id: String,
    #[serde(flatten)]
    comment: NewComment,
}

#[derive(Clone)]
pub struct CommentManager {
    config: Arc<Config>,
}

impl CommentManager {
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
            "loom_list_comments" => {
                let args: ListCommentsArgs = parse_args(tool, args)?;
                let video_id = require_id("videoId", &args.video_id)?;
                let page = args.page.to_params(&self.config);
                to_value(&client.list_comments(video_id, &page).await?)
            }
            "loom_create_comment" => {
                let args: CreateCommentArgs = parse_args(tool, args)?;
                let video_id = require_id("videoId", &args.video_id)?;
                if args.comment.text.trim().is_empty() {
                    return Err(ToolError::invalid_params("text must be a non-empty string"));
                }
                let comment = client.create_comment(video_id, &args.comment).await?;
                mutation_result("Comment added successfully", "comment", comment)
            }
            _ => Err(unknown_tool_error(tool, COMMENT_TOOLS)),
        }
    }
}

#[async_trait]
impl ToolHandler for CommentManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
