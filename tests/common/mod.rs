#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Response, Uri};
use axum::Router;
use loom_mcp::config::Config;
use loom_mcp::mcp::server::McpServer;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub const TOKEN: &str = "test-token";

/// One request as the stub upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

#[derive(Default)]
struct StubState {
    routes: StdMutex<HashMap<String, Canned>>,
    requests: StdMutex<Vec<Recorded>>,
}

/// Local HTTP server standing in for the Loom API. Unrouted requests get
/// `200 {}`.
pub struct StubUpstream {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let router = Router::new().fallback(record).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub upstream");
        });
        Self {
            base_url: format!("http://{}/v1", addr),
            state,
        }
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.respond_raw(method, path, status, Vec::new(), body);
    }

    pub fn respond_raw(
        &self,
        method: &str,
        path: &str,
        status: u16,
        headers: Vec<(&str, &str)>,
        body: String,
    ) {
        let canned = Canned {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        };
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(route_key(method, path), canned);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("at least one upstream request")
    }

    /// `_meta.headers` pointing a call at this stub with the test token.
    pub fn meta(&self) -> Value {
        json!({"headers": {"x-loom-access-token": TOKEN, "x-loom-base-url": self.base_url}})
    }
}

fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), path)
}

async fn record(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Body> {
    let query = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let headers = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = serde_json::from_slice(&body).ok();
    state.requests.lock().unwrap().push(Recorded {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body,
    });

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&route_key(method.as_str(), uri.path()))
        .cloned()
        .unwrap_or(Canned {
            status: 200,
            headers: Vec::new(),
            body: "{}".to_string(),
        });
    let mut builder = Response::builder()
        .status(canned.status)
        .header("content-type", "application/json");
    for (name, value) in &canned.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(canned.body)).unwrap()
}

pub fn server() -> McpServer {
    McpServer::new(Config::default()).expect("server must initialize")
}

/// Calls a tool the way an MCP client would and returns the result object.
pub async fn call(server: &McpServer, tool: &str, args: Value, meta: Value) -> Value {
    server
        .handle_tools_call(&json!({"name": tool, "arguments": args, "_meta": meta}))
        .await
        .expect("tools/call must produce a result envelope")
}

pub fn text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap_or_default()
}

pub fn is_error(result: &Value) -> bool {
    result["isError"].as_bool().unwrap_or(false)
}

/// Parses the success payload back out of the text content.
pub fn payload(result: &Value) -> Value {
    assert!(!is_error(result), "unexpected error: {}", text(result));
    serde_json::from_str(text(result)).expect("success text must be JSON")
}

pub fn video_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Weekly demo",
        "description": "Sprint review",
        "status": "ready",
        "privacy": "public",
        "duration": 125.5,
        "view_count": 12,
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z",
        "owner": {"id": "u1", "name": "Sam", "email": "sam@example.com"},
        "folder_id": "f1"
    })
}
