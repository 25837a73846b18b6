//! HTTP transport implementation.
//!
//! Two ways to talk JSON-RPC to the server over HTTP:
//!
//! - **SSE sessions**: `GET /sse` opens an event stream whose first event
//!   (`endpoint`) names the URL to POST messages to
//!   (`/message?sessionId=<uuid>`). Responses to those POSTs are pushed back
//!   on the stream as `message` events.
//! - **Stateless**: `POST /mcp` returns the JSON-RPC response in the body.
//!
//! Both paths share [`process_request`], which delegates to [`McpServer`].

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{
    RwLock,
    mpsc::{self, error::TrySendError},
};
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;

/// MCP protocol revision announced on initialize.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Responses buffered per SSE session before POSTs are refused.
pub const SESSION_QUEUE_CAPACITY: usize = 32;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

// ============================================================================
// JSON-RPC envelopes
// ============================================================================

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// `None` only when the member is absent; `"id": null` is `Some(Null)`.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Requests without an id are notifications and get no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

// ============================================================================
// SSE sessions
// ============================================================================

/// Open SSE sessions, keyed by the id handed out in the `endpoint` event.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, mpsc::Sender<JsonRpcResponse>>>>,
}

impl SessionStore {
    /// Register a new session and return its id and outbound receiver.
    pub async fn open(&self) -> (Uuid, mpsc::Receiver<JsonRpcResponse>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        self.inner.write().await.insert(id, tx);
        (id, rx)
    }

    /// Sender for an open session.
    pub async fn sender(&self, id: Uuid) -> Option<mpsc::Sender<JsonRpcResponse>> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn close(&self, id: Uuid) {
        if self.inner.write().await.remove(&id).is_some() {
            info!("SSE session {} closed", id);
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Removes a session from the store once its event stream is dropped.
struct SessionGuard {
    id: Uuid,
    sessions: SessionStore,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let sessions = self.sessions.clone();
        let id = self.id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { sessions.close(id).await });
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Open SSE sessions.
    sessions: SessionStore,
    /// Endpoint layout, echoed by the root handler.
    config: Arc<HttpConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router for this transport.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState {
            server,
            sessions: SessionStore::default(),
            config: Arc::new(self.config.clone()),
        };

        let mut app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route(&self.config.sse_path, get(handle_sse))
            .route(&self.config.message_path, post(handle_message))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (MCP over HTTP, CORS {})", addr, cors_status);
        info!("  → SSE stream: GET  {}", self.config.sse_path);
        info!("  → Messages:   POST {}?sessionId=...", self.config.message_path);
        info!("  → JSON-RPC:   POST {}", self.config.rpc_path);
        info!("  → Health:     GET  /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "sse": state.config.sse_path,
            "message": state.config.message_path,
            "rpc": state.config.rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0"
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Open an SSE session.
async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session_id, rx) = state.sessions.open().await;
    info!("SSE session {} opened", session_id);

    let endpoint = format!("{}?sessionId={}", state.config.message_path, session_id);
    let endpoint_event =
        tokio_stream::once(Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint)));

    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
    };
    let messages = ReceiverStream::new(rx).map(move |response| {
        let _ = &guard;
        Ok::<_, Infallible>(message_event(&response))
    });

    Sse::new(endpoint_event.chain(messages)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn message_event(response: &JsonRpcResponse) -> Event {
    let data = serde_json::to_string(response).unwrap_or_else(|e| {
        warn!("Failed to serialize response: {}", e);
        json!(JsonRpcResponse::internal_error(response.id.clone(), e.to_string())).to_string()
    });
    Event::default().event("message").data(data)
}

/// Query string of the session message endpoint.
#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Uuid,
}

/// Accept a JSON-RPC message for an SSE session.
#[instrument(skip_all, fields(session, method))]
async fn handle_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let span = tracing::Span::current();
    span.record("session", tracing::field::display(query.session_id));
    span.record("method", request.method.as_str());

    let Some(sender) = state.sessions.sender(query.session_id).await else {
        warn!("Message for unknown session");
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };

    let is_notification = request.is_notification();
    let response = process_request(&state.server, request);

    if is_notification {
        return StatusCode::ACCEPTED.into_response();
    }

    match sender.try_send(response) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(TrySendError::Full(_)) => {
            warn!("Session queue full, refusing message");
            (StatusCode::SERVICE_UNAVAILABLE, "Session queue full").into_response()
        }
        Err(TrySendError::Closed(_)) => {
            state.sessions.close(query.session_id).await;
            (StatusCode::NOT_FOUND, "Session closed").into_response()
        }
    }
}

/// Handle stateless JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(State(state): State<AppState>, Json(request): Json<JsonRpcRequest>) -> Response {
    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let is_notification = request.is_notification();
    let response = process_request(&state.server, request);

    if is_notification {
        return StatusCode::ACCEPTED.into_response();
    }
    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
pub fn process_request(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(server, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(server, request),
        "tools/call" => handle_tools_call(server, request),

        // Notifications need no result
        method if method.starts_with("notifications/") => {
            debug!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": server.name(),
            "version": server.version()
        },
        "instructions": server.instructions()
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    let result = json!({
        "tools": server.list_tools()
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/call request.
fn handle_tools_call(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
    };

    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
    };

    info!("Processing tools/call request for {}", name);

    let empty = Map::new();
    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            return JsonRpcResponse::invalid_params(request.id, "Arguments must be an object");
        }
    };

    JsonRpcResponse::success(request.id, server.call_tool(name, arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn server() -> McpServer {
        McpServer::new(Config::default()).unwrap()
    }

    fn app() -> Router {
        HttpTransport::new(HttpConfig::default()).router(server())
    }

    fn rpc(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn next_event(body: &mut Body) -> String {
        let frame = body.frame().await.unwrap().unwrap();
        let data = frame.into_data().unwrap();
        String::from_utf8(data.to_vec()).unwrap()
    }

    #[test]
    fn test_initialize() {
        let response = process_request(&server(), rpc("initialize", json!({})));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "leave-tools-mcp");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_invalid_version() {
        let mut request = rpc("tools/list", json!({}));
        request.jsonrpc = "1.0".to_string();
        let response = process_request(&server(), request);
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[test]
    fn test_unknown_method() {
        let response = process_request(&server(), rpc("resources/list", json!({})));
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[test]
    fn test_tools_call_missing_name() {
        let response = process_request(&server(), rpc("tools/call", json!({"arguments": {}})));
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "Missing tool name");
    }

    #[test]
    fn test_tools_call_non_object_arguments() {
        let params = json!({"name": "GetCurrentDate", "arguments": [1, 2]});
        let response = process_request(&server(), rpc("tools/call", params));
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[test]
    fn test_tools_call_unknown_tool_is_tool_error() {
        let params = json!({"name": "Nope", "arguments": {}});
        let response = process_request(&server(), rpc("tools/call", params));
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "unknown tool: Nope");
    }

    #[tokio::test]
    async fn test_rpc_tools_list() {
        let request = json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"});
        let response = app().oneshot(post_json("/mcp", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["id"], 7);
        let names: Vec<&str> = body["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["GetLeaveRecordAmount", "LeaveRequest", "GetCurrentDate"]);
    }

    #[tokio::test]
    async fn test_rpc_tools_call() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "a",
            "method": "tools/call",
            "params": {"name": "GetLeaveRecordAmount", "arguments": {"employeeName": "david"}}
        });
        let response = app().oneshot(post_json("/mcp", request)).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["result"]["content"][0]["text"], "5");
        assert_eq!(body["result"]["structuredContent"]["status"], "success");
    }

    #[tokio::test]
    async fn test_rpc_notification_accepted() {
        let request = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let response = app().oneshot(post_json("/mcp", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_message_for_unknown_session() {
        let uri = format!("/message?sessionId={}", Uuid::new_v4());
        let request = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
        let response = app().oneshot(post_json(&uri, request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sse_session_round_trip() {
        let app = app();

        let request = Request::builder().uri("/sse").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut events = response.into_body();

        let endpoint_event = next_event(&mut events).await;
        assert!(endpoint_event.contains("event: endpoint"));
        let endpoint = endpoint_event
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap()
            .to_string();
        assert!(endpoint.starts_with("/message?sessionId="));

        let call = json!({
            "jsonrpc": "2.0",
            "id": 42,
            "method": "tools/call",
            "params": {"name": "GetLeaveRecordAmount", "arguments": {"employeeName": "Eric"}}
        });
        let response = app.clone().oneshot(post_json(&endpoint, call)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let message_event = next_event(&mut events).await;
        assert!(message_event.contains("event: message"));
        let data = message_event
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap();
        let message: Value = serde_json::from_str(data).unwrap();
        assert_eq!(message["id"], 42);
        assert_eq!(message["result"]["structuredContent"]["value"], 6);
    }

    async fn open_session(app: &Router) -> (Body, String) {
        let request = Request::builder().uri("/sse").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let mut events = response.into_body();
        let endpoint = next_event(&mut events)
            .await
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap()
            .to_string();
        (events, endpoint)
    }

    #[tokio::test]
    async fn test_unread_session_queue_is_bounded() {
        let app = app();
        let (_events, endpoint) = open_session(&app).await;

        for id in 0..SESSION_QUEUE_CAPACITY {
            let ping = json!({"jsonrpc": "2.0", "id": id, "method": "ping"});
            let response = app.clone().oneshot(post_json(&endpoint, ping)).await.unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        let ping = json!({"jsonrpc": "2.0", "id": "overflow", "method": "ping"});
        let response = app.clone().oneshot(post_json(&endpoint, ping)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_null_id_is_a_request() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": null, "method": "ping"}))
                .unwrap();
        assert!(!request.is_notification());
        assert_eq!(request.id, Some(Value::Null));

        let absent: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "ping"})).unwrap();
        assert!(absent.is_notification());
    }

    #[tokio::test]
    async fn test_rpc_null_id_gets_response() {
        let request = json!({"jsonrpc": "2.0", "id": null, "method": "ping"});
        let response = app().oneshot(post_json("/mcp", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body.as_object().unwrap().contains_key("id"));
        assert!(body["id"].is_null());
        assert_eq!(body["result"], json!({}));
    }

    #[tokio::test]
    async fn test_session_store_open_close() {
        let store = SessionStore::default();
        let (id, _rx) = store.open().await;
        assert_eq!(store.len().await, 1);
        assert!(store.sender(id).await.is_some());

        store.close(id).await;
        assert!(store.is_empty().await);
        assert!(store.sender(id).await.is_none());
    }
}
