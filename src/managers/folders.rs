use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{mutation_result, parse_args, require_id, to_value, PageArgs};
use crate::config::Config;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::loom_client::LoomClient;
use crate::services::models::{FolderUpdate, NewFolder};
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_tool_error;

pub const FOLDER_TOOLS: &[&str] = &[
    "loom_list_folders",
    "loom_get_folder",
    "loom_create_folder",
    "loom_update_folder",
    "loom_delete_folder",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFoldersArgs {
    #[serde(flatten)]
    page: PageArgs,
    #[serde(default)]
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderArgs {
    folder_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFolderArgs {
    folder_id: String,
    #[serde(flatten)]
    update: FolderUpdate,
}

#[derive(Clone)]
pub struct FolderManager {
    logger: Logger,
    config: Arc<Config>,
}

impl FolderManager {
    pub fn new(logger: Logger, config: Arc<Config>) -> Self {
        Self {
            logger: logger.child("folders"),
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
            "loom_list_folders" => {
                let args: ListFoldersArgs = parse_args(tool, args)?;
                let parent_id = args
                    .parent_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty());
                let page = args.page.to_params(&self.config);
                to_value(&client.list_folders(&page, parent_id).await?)
            }
            "loom_get_folder" => {
                let args: FolderArgs = parse_args(tool, args)?;
                let id = require_id("folderId", &args.folder_id)?;
                to_value(&client.get_folder(id).await?)
            }
            "loom_create_folder" => {
                let folder: NewFolder = parse_args(tool, args)?;
                if folder.name.trim().is_empty() {
                    return Err(ToolError::invalid_params("name must be a non-empty string"));
                }
                let created = client.create_folder(&folder).await?;
                mutation_result("Folder created successfully", "folder", created)
            }
            "loom_update_folder" => {
                let args: UpdateFolderArgs = parse_args(tool, args)?;
                let id = require_id("folderId", &args.folder_id)?;
                if args.update == FolderUpdate::default() {
                    return Err(ToolError::invalid_params(
                        "Provide at least one of name or parentId",
                    ));
                }
                let folder = client.update_folder(id, &args.update).await?;
                mutation_result("Folder updated successfully", "folder", folder)
            }
            "loom_delete_folder" => {
                let args: FolderArgs = parse_args(tool, args)?;
                let id = require_id("folderId", &args.folder_id)?;
                client.delete_folder(id).await?;
                self.logger
                    .info("folder deleted", Some(&serde_json::json!({"folder_id": id})));
                mutation_result::<Value>("Folder deleted successfully", "folder", None)
            }
            _ => Err(unknown_tool_error(tool, FOLDER_TOOLS)),
        }
    }
}

#[async_trait]
impl ToolHandler for FolderManager {
    async fn handle(
        &self,
        tool: &str,
        client: &LoomClient,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.handle_tool(tool, client, args).await
    }
}
