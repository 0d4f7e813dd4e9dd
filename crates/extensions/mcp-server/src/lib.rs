//! MCP server for unravel.
//!
//! Speaks newline-delimited JSON-RPC 2.0 over stdio and dispatches
//! `tools/call` requests to the tools held in a [`ToolRegistry`].

mod protocol;
mod registry;
mod server;
mod transport;

pub use protocol::{McpContent, McpError, McpMethod, McpRequest, McpResponse, McpToolResult, RequestId};
pub use registry::{RegistryError, ToolRegistry};
pub use server::{McpServer, ServerInfo, PROTOCOL_VERSION};
pub use transport::{serve, serve_stdio, TransportError};
