pub mod api {
    pub const DEFAULT_BASE_URL: &str = "https://api.loom.com/v1";
    pub const EMBED_URL_PREFIX: &str = "https://www.loom.com/embed/";
    pub const USER_AGENT: &str = concat!("loom-mcp/", env!("CARGO_PKG_VERSION"));
    pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
}

pub mod headers {
    pub const ACCESS_TOKEN: &str = "x-loom-access-token";
    pub const BASE_URL: &str = "x-loom-base-url";
}

pub mod limits {
    pub const CHARACTER_LIMIT: usize = 50_000;
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;
}

pub mod embed {
    pub const DEFAULT_WIDTH: u32 = 640;
    pub const DEFAULT_HEIGHT: u32 = 360;
}

pub mod messages {
    pub const MISSING_TOKEN: &str =
        "Missing access token. Provide it via the x-loom-access-token header.";
    pub const AUTH_FAILED: &str = "Authentication failed. Please check your access token.";
    pub const NOT_FOUND: &str = "Resource not found";
}

pub mod tools {
    pub const NAME_PREFIX: &str = "loom_";
}

pub mod server {
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
    pub const NAME: &str = "loom-mcp";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
