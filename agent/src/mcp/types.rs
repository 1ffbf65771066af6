//! MCP type definitions
//!
//! Shared types used across the loader, the launcher and the agent runtime.

use std::collections::HashMap;

use serde_json::Value;

/// A tool from an MCP server
#[derive(Debug, Clone)]
pub struct McpTool {
    /// Server this tool belongs to
    pub server: String,
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: Option<String>,
    /// Input schema (JSON)
    pub input_schema: Option<Value>,
}

/// One entry of the `mcpServers` map: how to launch a tool server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerDescriptor {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment; values may reference `$VARS` and are expanded at launch
    pub env: HashMap<String, String>,
}

impl McpServerDescriptor {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: HashMap::new(),
        }
    }
}
