pub mod comments;
pub mod folders;
pub mod sharing;
pub mod spaces;
pub mod user;
pub mod videos;
pub mod workspaces;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::errors::ToolError;
use crate::services::loom_client::PageParams;

pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|err| ToolError::invalid_params(format!("Invalid arguments for {}: {}", tool, err)))
}

/// Rejects blank identifiers before they turn into a different endpoint.
pub(crate) fn require_id<'a>(label: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_params(format!(
            "{} must be a non-empty string",
            label
        )));
    }
    Ok(trimmed)
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    Ok(serde_json::to_value(value)?)
}

/// `{ success, message, <key>: payload }`; the payload is left out when the
/// API answered without content.
pub(crate) fn mutation_result<T: Serialize>(
    message: &str,
    key: &str,
    payload: Option<T>,
) -> Result<Value, ToolError> {
    let mut out = serde_json::Map::new();
    out.insert("success".to_string(), Value::Bool(true));
    out.insert("message".to_string(), Value::String(message.to_string()));
    if let Some(payload) = payload {
        out.insert(key.to_string(), serde_json::to_value(payload)?);
    }
    Ok(Value::Object(out))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageArgs {
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl PageArgs {
    pub fn to_params(&self, config: &Config) -> PageParams {
        PageParams {
            per_page: config.clamp_page_size(self.per_page),
            next_cursor: self.next_cursor.clone().filter(|c| !c.trim().is_empty()),
        }
    }
}
