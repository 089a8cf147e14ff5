//! Tool Registry - ordered registration and O(1) lookup for all tools.
//!
//! The registry is populated once at server start-up and is read-only
//! thereafter. Registration is strict: re-registering an existing name
//! fails with [`ToolError::Duplicate`]. Discovery (`tools/list`) returns
//! tools in registration order and exposes metadata only, never handlers.

use std::collections::HashMap;

use super::definition::{ToolDefinition, ToolMetadata};
use super::error::ToolError;

/// Tool registry - maps tool names to their definitions.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
    /// Registration order, preserved for discovery.
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), ToolError> {
        let name = definition.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, definition);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Discovery metadata for all tools, in registration order.
    pub fn list(&self) -> Vec<ToolMetadata> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(ToolDefinition::metadata)
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
