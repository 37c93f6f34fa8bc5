pub mod credentials;
pub mod logger;
pub mod loom_client;
pub mod models;
pub mod tool_executor;
