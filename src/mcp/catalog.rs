use crate::config::Config;
use crate::errors::McpError;
use crate::utils::suggest::suggest;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{JSONSchema, ValidationError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static RAW_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

const PAGE_SIZE_FIELD: &str = "perPage";

/// Published tool definitions plus compiled argument validators.
pub struct ToolCatalog {
    tools: Vec<ToolDef>,
    validators: HashMap<String, JSONSchema>,
}

impl ToolCatalog {
    pub fn new(config: &Config) -> Self {
        let tools: Vec<ToolDef> = RAW_CATALOG
            .iter()
            .cloned()
            .map(|mut tool| {
                apply_page_limits(&mut tool.input_schema, config);
                tool
            })
            .collect();
        let validators = tools
            .iter()
            .filter_map(|tool| {
                JSONSchema::compile(&tool.input_schema)
                    .ok()
                    .map(|schema| (tool.name.clone(), schema))
            })
            .collect();
        Self { tools, validators }
    }

    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDef> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name.clone()).collect()
    }

    pub fn validate_args(&self, tool_name: &str, args: &Value) -> Result<(), McpError> {
        let (Some(tool), Some(schema)) = (self.get(tool_name), self.validators.get(tool_name))
        else {
            return Ok(());
        };
        if let Err(errors) = schema.validate(args) {
            let rendered: Vec<String> = errors
                .take(10)
                .map(|err| {
                    let path = err.instance_path.to_string();
                    let path = if path.is_empty() { "(root)".to_string() } else { path };
                    describe_error(&path, &err, &tool.input_schema)
                })
                .collect();
            let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
            lines.extend(rendered.into_iter().map(|line| format!("- {}", line)));
            return Err(McpError::invalid_params(lines.join("\n")));
        }
        Ok(())
    }
}

fn describe_error(path: &str, err: &ValidationError, schema: &Value) -> String {
    match &err.kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            let known: Vec<String> = schema
                .get("properties")
                .and_then(|v| v.as_object())
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default();
            unexpected
                .iter()
                .map(|field| {
                    let close = suggest_field(field, &known);
                    match close {
                        Some(name) => format!(
                            "{}: unknown field '{}' (did you mean '{}'?)",
                            path, field, name
                        ),
                        None => format!("{}: unknown field '{}'", path, field),
                    }
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
        ValidationErrorKind::Required { property } => {
            let prop = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            format!("{}: missing required field '{}'", path, prop)
        }
        ValidationErrorKind::Enum { options } => {
            let allowed: Vec<String> = options
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                        .collect()
                })
                .unwrap_or_default();
            format!("{}: expected one of {}", path, allowed.join(", "))
        }
        ValidationErrorKind::Type { kind } => {
            let expected = match kind {
                TypeKind::Single(primitive) => primitive.to_string(),
                TypeKind::Multiple(types) => (*types)
                    .into_iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" | "),
            };
            format!("{}: expected {}", path, expected)
        }
        _ => format!("{}: {}", path, err),
    }
}

fn suggest_field(field: &str, known: &[String]) -> Option<String> {
    let lowered = field.to_lowercase().replace('_', "");
    known
        .iter()
        .find(|name| name.to_lowercase() == lowered)
        .cloned()
        .or_else(|| suggest(field, known, 1).into_iter().next())
}

/// Publishes the configured page-size limits on every `perPage` property.
fn apply_page_limits(schema: &mut Value, config: &Config) {
    let Some(prop) = schema
        .get_mut("properties")
        .and_then(|props| props.get_mut(PAGE_SIZE_FIELD))
        .and_then(|prop| prop.as_object_mut())
    else {
        return;
    };
    prop.insert("minimum".to_string(), Value::from(1));
    prop.insert("maximum".to_string(), Value::from(config.max_page_size));
    prop.insert("default".to_string(), Value::from(config.default_page_size));
    prop.insert(
        "description".to_string(),
        Value::String(format!(
            "Number of items per page (default {}, max {}).",
            config.default_page_size, config.max_page_size
        )),
    );
}
