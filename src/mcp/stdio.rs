//! Line-delimited JSON-RPC transport over stdio (§6). Hand-rolled, in the
//! teacher's style, rather than wired through a generic MCP server crate —
//! the wire surface is five fixed tools and three methods of interest.

use crate::config::Config;
use crate::mcp::router;
use crate::mcp::schema::tool_catalog;
use crate::session::BrowserSession;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

pub struct McpService {
    pub session: Arc<BrowserSession>,
}

impl McpService {
    pub fn new() -> Self {
        let config = Config::from_env();
        info!(
            chrome_port = config.chrome.port,
            edge_port = config.edge.port,
            "starting browser-bridge-mcp"
        );
        McpService {
            session: BrowserSession::new(config),
        }
    }
}

impl Default for McpService {
    fn default() -> Self {
        Self::new()
    }
}

fn jsonrpc_error(id: &Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

fn jsonrpc_result(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn handle_tools_list(id: &Value) -> Value {
    let tools: Vec<Value> = tool_catalog()
        .into_iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema,
            })
        })
        .collect();
    jsonrpc_result(id, json!({ "tools": tools }))
}

async fn handle_tools_call(service: &McpService, id: &Value, params: &Value) -> Value {
    let name = params.get("name").and_then(Value::as_str);
    let Some(name) = name else {
        return jsonrpc_error(id, -32602, "Missing required field: params.name");
    };
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match router::dispatch(&service.session, name, arguments).await {
        Ok(response) => match serde_json::to_value(response) {
            Ok(v) => jsonrpc_result(id, v),
            Err(e) => jsonrpc_error(id, -32603, format!("failed to serialize result: {e}")),
        },
        Err(protocol_error) => jsonrpc_error(id, -32602, protocol_error),
    }
}

pub async fn run() -> anyhow::Result<()> {
    let service = McpService::new();
    info!("MCP stdio server initialized; waiting for client session");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    let mut has_initialize = false;
    let mut is_initialized = false;
    let mut shutdown_requested = false;

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Ok(msg) = serde_json::from_str::<Value>(trimmed) else {
            continue;
        };

        let method = msg.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let id = msg.get("id").cloned().unwrap_or(Value::Null);
        let is_request = msg.get("id").is_some();
        let params = msg.get("params").cloned().unwrap_or(Value::Null);

        // Notifications
        if !is_request {
            match method {
                "initialized" => {
                    has_initialize = true;
                    is_initialized = true;
                    continue;
                }
                "exit" => {
                    if shutdown_requested {
                        break;
                    }
                    continue;
                }
                _ => continue,
            }
        }

        // Requests
        let response = match method {
            "initialize" => {
                has_initialize = true;
                // Do not mark initialized until we get the notification.
                let server_info = json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                });
                jsonrpc_result(
                    &id,
                    json!({
                        "protocolVersion": "2024-11-05",
                        "capabilities": {"tools": {}},
                        "serverInfo": server_info
                    }),
                )
            }
            "shutdown" => {
                shutdown_requested = true;
                jsonrpc_result(&id, Value::Null)
            }
            "tools/list" => {
                if !has_initialize || !is_initialized {
                    jsonrpc_error(&id, -32002, "Server not initialized")
                } else {
                    handle_tools_list(&id)
                }
            }
            "tools/call" => {
                if !has_initialize || !is_initialized {
                    jsonrpc_error(&id, -32002, "Server not initialized")
                } else {
                    handle_tools_call(&service, &id, &params).await
                }
            }
            _ => jsonrpc_error(&id, -32601, format!("Method not found: {}", method)),
        };

        let out = serde_json::to_string(&response).unwrap_or_else(|e| {
            serde_json::to_string(&jsonrpc_error(&id, -32603, format!("serialize error: {}", e)))
                .unwrap_or_else(|_| "{\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32603,\"message\":\"serialize error\"}}".to_string())
        });

        stdout.write_all(out.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    // Transport shutdown: pages stay open in the user's browser, but our
    // view of them is gone (§5).
    service.session.pool().clear().await;
    warn!("MCP stdio server stopped");
    Ok(())
}
