// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MCP server: newline-delimited JSON-RPC over an async reader/writer pair.
//!
//! Each request runs on its own task so a slow upstream call does not hold
//! up the rest of the session. Responses are funneled through one writer
//! task. In-flight requests can be aborted with `notifications/cancelled`.

use crate::error::AppError;
use crate::mcp::protocol::{
    CallToolParams, CallToolResult, CancelledParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListChangedCapability, ListResourcesResult,
    ListToolsResult, ReadResourceParams, ServerCapabilities, ServerInfo, PROTOCOL_VERSION,
};
use crate::mcp::registry::EndpointRegistry;
use dashmap::DashMap;
use futures_util::future::{abortable, AbortHandle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "whoop-provider";

/// MCP server over an [`EndpointRegistry`].
#[derive(Clone)]
pub struct McpServer {
    registry: Arc<EndpointRegistry>,
    /// Abort handles of running requests, keyed by serialized request id.
    in_flight: Arc<DashMap<String, AbortHandle>>,
}

impl McpServer {
    pub fn new(registry: EndpointRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Number of requests currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Serve on the process stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> anyhow::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `reader` reaches EOF and all running requests finish.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut tasks = JoinSet::new();
        let mut lines = BufReader::new(reader).lines();

        tracing::info!("MCP server started");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request = match parse_request(&line) {
                Ok(request) => request,
                Err((id, error)) => {
                    tracing::warn!(code = error.code, "Rejected message");
                    let _ = tx.send(JsonRpcResponse::error(id, error));
                    continue;
                }
            };

            if request.is_notification() {
                self.handle_notification(&request);
                continue;
            }

            let key = request_key(request.id.as_ref());
            if self.in_flight.contains_key(&key) {
                tracing::warn!(request_id = %key, "Duplicate in-flight request id");
                let _ = tx.send(JsonRpcResponse::error(
                    request.id.unwrap_or(Value::Null),
                    JsonRpcError::custom(-32600, format!("Request id {} already in flight", key)),
                ));
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            let task_key = key.clone();

            let (task, handle) = abortable(async move {
                let response = server.handle_request(request).await;
                // Free the id before the client can see the response and reuse it
                server.in_flight.remove(&task_key);
                if let Some(response) = response {
                    let _ = tx.send(response);
                }
            });

            self.in_flight.insert(key, handle);
            reap_finished(&mut tasks);
            tasks.spawn(task);
        }

        tracing::info!("Input closed, waiting for in-flight requests");
        while tasks.join_next().await.is_some() {}

        drop(tx);
        writer_task.await??;

        tracing::info!("MCP server stopped");
        Ok(())
    }

    /// Handle a single request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        tracing::debug!(method = %request.method, "Handling request");

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => to_result(InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    resources: ListChangedCapability {
                        list_changed: false,
                    },
                    tools: ListChangedCapability {
                        list_changed: false,
                    },
                },
                server_info: ServerInfo {
                    name: SERVER_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            }),
            "ping" => Ok(json!({})),
            "resources/list" => to_result(ListResourcesResult {
                resources: self.registry.list_resources(),
            }),
            "resources/read" => {
                let params: ReadResourceParams = parse_params(params)?;
                let result = self.registry.read_resource(&params.uri).await.map_err(|e| {
                    tracing::warn!(uri = %params.uri, error = %e, "Resource read failed");
                    JsonRpcError::from(e)
                })?;
                to_result(result)
            }
            "tools/list" => to_result(ListToolsResult {
                tools: self.registry.list_tools(),
            }),
            "tools/call" => {
                let params: CallToolParams = parse_params(params)?;
                let result = match self.registry.call_tool(&params.name, params.arguments).await
                {
                    Ok(result) => result,
                    Err(AppError::BadRequest(msg)) => {
                        return Err(JsonRpcError::invalid_params(msg))
                    }
                    Err(e) => {
                        tracing::warn!(tool = %params.name, error = %e, "Tool call failed");
                        CallToolResult::error(e.to_string())
                    }
                };
                to_result(result)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/cancelled" => {
                let params: CancelledParams = match parse_params(request.params.clone()) {
                    Ok(params) => params,
                    Err(_) => {
                        tracing::warn!("Malformed cancellation");
                        return;
                    }
                };
                self.cancel(&params.request_id, params.reason.as_deref());
            }
            "notifications/initialized" => tracing::info!("Client initialized"),
            other => tracing::debug!(method = %other, "Ignoring notification"),
        }
    }

    /// Abort a running request. Returns whether it was still running.
    pub fn cancel(&self, request_id: &Value, reason: Option<&str>) -> bool {
        match self.in_flight.remove(&request_key(Some(request_id))) {
            Some((_, handle)) => {
                handle.abort();
                tracing::info!(request_id = %request_id, reason, "Request cancelled");
                true
            }
            None => false,
        }
    }
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Drop completed tasks so a long session does not accumulate them.
fn reap_finished<T: 'static>(tasks: &mut JoinSet<T>) {
    while tasks.try_join_next().is_some() {}
}

/// Parse one input line. Unparsable JSON is a parse error; JSON that is not
/// a request is an invalid request, echoing its id when one is present.
fn parse_request(line: &str) -> Result<JsonRpcRequest, (Value, JsonRpcError)> {
    let value: Value =
        serde_json::from_str(line).map_err(|_| (Value::Null, JsonRpcError::parse_error()))?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|_| (id, JsonRpcError::invalid_request()))
}

/// Request ids may be numbers or strings; `1` and `"1"` are distinct.
fn request_key(id: Option<&Value>) -> String {
    id.map(Value::to_string).unwrap_or_default()
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(e.to_string()))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
