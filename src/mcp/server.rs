use crate::app::App;
use crate::config::Config;
use crate::constants::server;
use crate::errors::{ErrorCode, McpError, ToolError, ToolErrorKind};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::credentials::RequestMeta;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

fn map_tool_error(tool: &str, error: &ToolError) -> McpError {
    let mut message = format!("{} (tool: {})", error.message, tool);
    if let Some(hint) = &error.hint {
        message.push_str(&format!(". {}", hint));
    }
    match error.kind {
        ToolErrorKind::InvalidParams | ToolErrorKind::NotFound => {
            McpError::new(ErrorCode::InvalidParams, message)
        }
        ToolErrorKind::Denied => McpError::new(ErrorCode::InvalidRequest, message),
        _ => McpError::new(ErrorCode::InternalError, message),
    }
}

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(config: Config) -> Result<Self, ToolError> {
        let app = App::initialize(config)?;
        Ok(Self { app: Arc::new(app) })
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": server::PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": server::NAME, "version": server::VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": self.app.catalog.tools() })
    }

    /// Validates arguments against the published schema, pulls tenant
    /// credentials out of `_meta.headers` and runs the tool.
    pub async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if name.is_empty() {
            return Err(McpError::invalid_params("Missing tool name"));
        }
        let args = match params.get("arguments") {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(args) => args.clone(),
        };
        self.app.catalog.validate_args(name, &args)?;

        let meta = RequestMeta::from_call_params(params);
        let response = self
            .app
            .tool_executor
            .execute(name, args, &meta)
            .await
            .map_err(|err| map_tool_error(name, &err))?;
        serde_json::to_value(response)
            .map_err(|err| McpError::new(ErrorCode::InternalError, err.to_string()))
    }

    /// Dispatches one parsed request. Notifications yield `None`.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method.starts_with("notifications/") && request.is_notification() {
            return None;
        }
        let id = request.id.clone()?;
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" | "notifications/initialized" => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => match self.handle_tools_call(&request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::from_error(id, err),
            },
            _ => JsonRpcResponse::failure(id, ErrorCode::MethodNotFound, "Method not found"),
        };
        Some(response)
    }

    /// Line-delimited JSON-RPC loop over any reader/writer pair.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut writer = BufWriter::new(writer);

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Value>(trimmed) {
                Err(_) => Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError,
                    "Parse error",
                )),
                Ok(parsed) => match serde_json::from_value::<JsonRpcRequest>(parsed) {
                    Ok(request) => self.handle_request(request).await,
                    Err(_) => Some(JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::InvalidRequest,
                        "Invalid request",
                    )),
                },
            };

            if let Some(response) = response {
                let payload = serde_json::to_string(&response)?;
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        self.app
            .logger
            .debug("input closed", Some(&self.app.logger.stats()));
        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.app.logger.info("listening on stdio", None);
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

pub async fn run_stdio(config: Config) -> Result<(), ToolError> {
    let server = McpServer::new(config)?;
    server.run_stdio().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server() -> McpServer {
        McpServer::new(Config::default()).expect("server")
    }

    async fn roundtrip(server: &McpServer, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        server
            .serve(input.as_bytes(), &mut out)
            .await
            .expect("serve");
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn initialize_and_list_tools() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let responses = roundtrip(&server(), input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "loom-mcp");
        let tools = responses[1]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 28);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn closing_input_logs_counters() {
        let server = server();
        roundtrip(&server, "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n").await;
        let stats = server.app.logger.stats();
        assert_eq!(stats["context"], "loom");
        assert!(stats["debug"].as_u64().unwrap_or(0) >= 1);
    }

    #[tokio::test]
    async fn malformed_lines_get_parse_error() {
        let responses = roundtrip(&server(), "{not json\n").await;
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[0]["id"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let responses = roundtrip(
            &server(),
            "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"resources/list\"}\n",
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn unknown_tool_suggests_a_name() {
        let err = server()
            .handle_tools_call(&json!({"name": "loom_get_vidoe", "arguments": {}}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("loom_get_video"), "{}", err.message);
    }

    #[tokio::test]
    async fn schema_violations_are_invalid_params() {
        let err = server()
            .handle_tools_call(&json!({"name": "loom_get_video", "arguments": {"video_id": "v1"}}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("videoId"));
    }

    #[tokio::test]
    async fn missing_token_comes_back_as_error_content() {
        let result = server()
            .handle_tools_call(&json!({"name": "loom_get_video", "arguments": {"videoId": "v1"}}))
            .await
            .expect("envelope");
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: Missing access token"), "{}", text);
    }
}
