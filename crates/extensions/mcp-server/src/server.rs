//! Request dispatch for the MCP server.

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unravel_protocols::tool::ToolContext;

use crate::protocol::{McpError, McpMethod, McpRequest, McpResponse, McpToolResult};
use crate::registry::ToolRegistry;

/// MCP protocol revision implemented by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name and version reported in the `initialize` handshake.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<serde_json::Value>,
}

/// MCP server. Stateless per request apart from its session id.
pub struct McpServer {
    info: ServerInfo,
    registry: Arc<ToolRegistry>,
    session_id: String,
}

impl McpServer {
    pub fn new(info: ServerInfo, registry: Arc<ToolRegistry>) -> Self {
        Self {
            info,
            registry,
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Handle one message. Notifications never produce a response.
    pub async fn handle(&self, request: McpRequest, cancel: CancellationToken) -> Option<McpResponse> {
        if request.jsonrpc != "2.0" {
            return request
                .id
                .map(|id| McpResponse::error(Some(id), McpError::invalid_request()));
        }

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        let result = match McpMethod::parse(&request.method) {
            Some(McpMethod::Initialize) => Ok(self.initialize()),
            Some(McpMethod::Ping) => Ok(serde_json::json!({})),
            Some(McpMethod::ListTools) => Ok(self.list_tools()),
            Some(McpMethod::CallTool) => self.call_tool(request.params, cancel).await,
            _ => Err(McpError::method_not_found().with_data(serde_json::json!(request.method))),
        };

        Some(match result {
            Ok(value) => McpResponse::success(Some(id), value),
            Err(error) => McpResponse::error(Some(id), error),
        })
    }

    fn initialize(&self) -> serde_json::Value {
        info!(name = %self.info.name, version = %self.info.version, "Client initialized session");
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version
            }
        })
    }

    fn list_tools(&self) -> serde_json::Value {
        let tools: Vec<serde_json::Value> = self
            .registry
            .list()
            .iter()
            .map(|definition| definition.to_mcp_tool())
            .collect();
        serde_json::json!({ "tools": tools })
    }

    async fn call_tool(
        &self,
        params: Option<serde_json::Value>,
        cancel: CancellationToken,
    ) -> Result<serde_json::Value, McpError> {
        let params: CallToolParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::invalid_params().with_data(serde_json::json!(e.to_string())))?
            .ok_or_else(|| {
                McpError::invalid_params().with_data(serde_json::json!("Missing tool call params"))
            })?;

        let tool = self.registry.get(&params.name).ok_or_else(|| {
            McpError::invalid_params()
                .with_data(serde_json::json!(format!("Unknown tool: {}", params.name)))
        })?;

        let arguments = params.arguments.unwrap_or_else(|| serde_json::json!({}));
        let mut ctx = ToolContext::new(self.session_id.clone());
        ctx.cancellation = cancel;

        debug!(tool = %params.name, correlation_id = %ctx.correlation_id, "Calling tool");
        let outcome = match tool.validate(&arguments) {
            Ok(()) => tool.execute(arguments, ctx).await,
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(result) if result.success => {
                McpToolResult::text(result.content, false).with_meta(result.metadata)
            }
            Ok(result) => McpToolResult::text(result.error.unwrap_or_default(), true),
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                McpToolResult::text(e.to_string(), true)
            }
        };

        serde_json::to_value(result)
            .map_err(|e| McpError::internal_error().with_data(serde_json::json!(e.to_string())))
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
