//! # Unravel Protocols
//!
//! Protocol definitions (traits) shared across the unravel workspace.
//! Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`Tool`] - Trait for tools exposed over MCP
//! - [`LLMProvider`] - Trait for LLM backends consumed as the deobfuscation oracle

pub mod error;
pub mod provider;
pub mod tool;
pub mod types;

pub use error::{ProviderError, ToolError};
pub use provider::{CompletionRequest, CompletionResponse, LLMProvider};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolResult};
pub use types::*;
