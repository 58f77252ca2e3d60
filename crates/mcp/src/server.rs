// MCP server: JSON-RPC 2.0, one message per line

use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
    PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;

pub const SERVER_NAME: &str = "parliament-mcp";

/// Requests still running, keyed by their JSON-encoded id
type InFlight = Arc<Mutex<HashMap<String, CancellationToken>>>;

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    in_flight: InFlight,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn start(&self) -> Result<()> {
        tracing::info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    ///
    /// Each request runs in its own task, so a slow tool call does not hold
    /// up later messages and `notifications/cancelled` can reach it. Returns
    /// once the reader is exhausted and every in-flight request has settled.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new());
        let mut sink = FramedWrite::new(writer, LinesCodec::new());
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let read = async move {
            while let Some(line) = lines.next().await {
                let line = line.context("Failed to read from MCP client")?;
                if line.trim().is_empty() {
                    continue;
                }
                self.dispatch(&line, &tx).await;
            }
            tracing::info!("MCP client disconnected");
            Ok::<_, anyhow::Error>(())
        };

        let write = async move {
            while let Some(response) = rx.recv().await {
                let encoded =
                    serde_json::to_string(&response).context("Failed to encode response")?;
                sink.send(encoded)
                    .await
                    .context("Failed to write to MCP client")?;
            }
            Ok::<_, anyhow::Error>(())
        };

        let (read_result, write_result) = tokio::join!(read, write);
        read_result?;
        write_result
    }

    /// Route one line: notifications inline, requests onto their own task
    async fn dispatch(&self, line: &str, tx: &mpsc::UnboundedSender<JsonRpcResponse>) {
        let request = match parse(line) {
            Ok(request) => request,
            Err(response) => {
                let _ = tx.send(response);
                return;
            }
        };

        let Some(id) = request.id.clone() else {
            self.handle_notification(&request).await;
            return;
        };

        let key = id.to_string();
        let token = CancellationToken::new();
        self.in_flight.lock().await.insert(key.clone(), token.clone());

        let server = self.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = server.respond(request, id, token.clone()).await;
            server.in_flight.lock().await.remove(&key);

            if token.is_cancelled() {
                tracing::debug!(request = %key, "Dropping response to cancelled request");
            } else if tx.send(response).is_err() {
                tracing::warn!(request = %key, "MCP client gone before response was sent");
            }
        });
    }

    /// Handle one raw line; `None` when nothing should be sent back
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        match parse(line) {
            Ok(request) => self.handle_request(request).await,
            Err(response) => Some(response),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request).await;
            return None;
        };
        Some(self.respond(request, id, CancellationToken::new()).await)
    }

    async fn respond(
        &self,
        request: JsonRpcRequest,
        id: Value,
        token: CancellationToken,
    ) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "MCP request");

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(request.params, token).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        }
    }

    async fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => tracing::info!("MCP client initialized"),
            "notifications/cancelled" => {
                let Some(request_id) = request.params.as_ref().and_then(|p| p.get("requestId"))
                else {
                    tracing::debug!("Cancellation without a requestId");
                    return;
                };
                let key = request_id.to_string();
                match self.in_flight.lock().await.get(&key) {
                    Some(token) => {
                        tracing::info!(request = %key, "MCP client cancelled a request");
                        token.cancel();
                    }
                    None => tracing::debug!(request = %key, "Cancellation for a request no longer running"),
                }
            }
            other => tracing::debug!(method = %other, "Ignoring notification"),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => tracing::info!(
                    client = %init.client_info.name,
                    client_version = %init.client_info.version,
                    protocol = %init.protocol_version,
                    "MCP client connected"
                ),
                Err(e) => return Err(JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e))),
            }
        }

        to_result(&InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    fn list_tools(&self) -> Result<Value, JsonRpcError> {
        to_result(&ListToolsResult {
            tools: self.registry.list_schemas(),
        })
    }

    async fn call_tool(
        &self,
        params: Option<Value>,
        token: CancellationToken,
    ) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing tools/call params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))
            })?;

        let tool = self
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        let arguments = params.arguments.unwrap_or(Value::Object(Default::default()));
        let result = tool
            .execute_with_cancellation(arguments, token)
            .await
            .map_err(|e| {
                tracing::warn!(tool = %params.name, error = %format!("{:#}", e), "Tool call rejected");
                JsonRpcError::invalid_params(format!("{:#}", e))
            })?;

        to_result(&result)
    }
}

/// Decode a line into a request, or the error response to send instead
fn parse(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let raw: Value = serde_json::from_str(line).map_err(|e| {
        tracing::warn!(error = %e, "Unparseable message");
        JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(e))
    })?;

    let id = raw.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value::<JsonRpcRequest>(raw).map_err(|e| {
        JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
        )
    })
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
