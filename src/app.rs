use crate::config::Config;
use crate::constants::api;
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::ToolCatalog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Arc<Config>,
    pub catalog: Arc<ToolCatalog>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        catalog: &ToolCatalog,
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing: Vec<String> = catalog
            .names()
            .into_iter()
            .filter(|name| !handlers.contains_key(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "This is a server wiring bug: every tool in tool_catalog.json must have a handler."
                    .to_string(),
            )
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    fn register(
        handlers: &mut HashMap<String, Arc<dyn ToolHandler>>,
        tools: &[&str],
        handler: Arc<dyn ToolHandler>,
    ) {
        for tool in tools {
            handlers.insert((*tool).to_string(), handler.clone());
        }
    }

    pub fn initialize(config: Config) -> Result<Self, ToolError> {
        let logger = Logger::new("loom");
        let config = Arc::new(config);

        let http = reqwest::Client::builder()
            .user_agent(api::USER_AGENT)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;

        let user_manager = Arc::new(managers::user::UserManager::new(logger.clone()));
        let video_manager = Arc::new(managers::videos::VideoManager::new(
            logger.clone(),
            config.clone(),
        ));
        let comment_manager = Arc::new(managers::comments::CommentManager::new(config.clone()));
        let folder_manager = Arc::new(managers::folders::FolderManager::new(
            logger.clone(),
            config.clone(),
        ));
        let workspace_manager =
            Arc::new(managers::workspaces::WorkspaceManager::new(config.clone()));
        let space_manager = Arc::new(managers::spaces::SpaceManager::new(
            logger.clone(),
            config.clone(),
        ));
        let sharing_manager = Arc::new(managers::sharing::SharingManager::new());

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        Self::register(&mut handlers, managers::user::USER_TOOLS, user_manager);
        Self::register(&mut handlers, managers::videos::VIDEO_TOOLS, video_manager);
        Self::register(
            &mut handlers,
            managers::comments::COMMENT_TOOLS,
            comment_manager,
        );
        Self::register(&mut handlers, managers::folders::FOLDER_TOOLS, folder_manager);
        Self::register(
            &mut handlers,
            managers::workspaces::WORKSPACE_TOOLS,
            workspace_manager,
        );
        Self::register(&mut handlers, managers::spaces::SPACE_TOOLS, space_manager);
        Self::register(
            &mut handlers,
            managers::sharing::SHARING_TOOLS,
            sharing_manager,
        );

        let catalog = Arc::new(ToolCatalog::new(&config));
        Self::validate_tool_wiring(&catalog, &handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(
            logger.clone(),
            config.clone(),
            http,
            handlers,
        ));
        logger.info(
            "initialized",
            Some(&serde_json::json!({ "tools": catalog.names().len() })),
        );

        Ok(Self {
            logger,
            config,
            catalog,
            tool_executor,
        })
    }
}
