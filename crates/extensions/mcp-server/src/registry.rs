//! Tool registry for managing available tools.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use unravel_protocols::tool::{Tool, ToolDefinition};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

/// Thread-safe registry of tools keyed by their definition id.
pub struct ToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// Returns an error if a tool with the same id is already registered.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let id = tool.definition().id.clone();
        if self.tools.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.tools.insert(id, tool);
        Ok(())
    }

    /// Unregister a tool.
    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.tools
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        Ok(())
    }

    /// Get a tool by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).map(|tool| tool.clone())
    }

    /// List all tool definitions, ordered by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .iter()
            .map(|entry| entry.value().definition().clone())
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
