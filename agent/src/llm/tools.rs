//! Tool-related helpers for the runtime
//!
//! - Converting MCP tools to OpenAI function-tool definitions
//! - Cleaning JSON schemas that strict endpoints reject
//! - Routing a tool name back to the server that owns it

use std::collections::HashMap;

use serde::Serialize;

use crate::mcp::{McpTool, ToolServer};

/// A function tool definition
#[derive(Debug, Serialize, Clone)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Serialize, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Schema keywords some OpenAI-compatible backends reject
const STRIPPED_KEYWORDS: &[&str] = &["$schema", "title", "additionalProperties"];

/// Keywords whose object keys are user-chosen names, not keywords
const NAMED_SCHEMA_MAPS: &[&str] = &["properties", "patternProperties", "definitions", "$defs"];

/// Keywords whose values are data, never schemas
const LITERAL_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// Clean up a JSON schema for OpenAI-compatible endpoints
/// Removes $schema, title, and additionalProperties keywords at every level
pub fn clean_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(obj) => {
            let mut cleaned = serde_json::Map::new();
            for (key, value) in obj {
                if STRIPPED_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let value = if NAMED_SCHEMA_MAPS.contains(&key.as_str()) {
                    clean_named_schemas(value)
                } else if LITERAL_KEYWORDS.contains(&key.as_str()) {
                    value.clone()
                } else {
                    clean_schema(value)
                };
                cleaned.insert(key.clone(), value);
            }
            serde_json::Value::Object(cleaned)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(clean_schema).collect())
        }
        other => other.clone(),
    }
}

/// Keep every name in a `properties`-style map and clean each schema under it
fn clean_named_schemas(map: &serde_json::Value) -> serde_json::Value {
    match map {
        serde_json::Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(name, schema)| (name.clone(), clean_schema(schema)))
                .collect(),
        ),
        other => clean_schema(other),
    }
}

/// Convert MCP tools to function tools
pub fn function_tools(tools: &[McpTool]) -> Vec<FunctionTool> {
    tools
        .iter()
        .map(|tool| {
            let parameters = tool
                .input_schema
                .as_ref()
                .map(clean_schema)
                .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}));

            FunctionTool {
                tool_type: "function",
                function: FunctionDefinition {
                    name: tool.name.clone(),
                    description: tool.description.clone().unwrap_or_default(),
                    parameters,
                },
            }
        })
        .collect()
}

/// Maps tool names to the server exposing them; first server wins on clashes
pub struct ToolRouter<'a> {
    routes: HashMap<String, &'a dyn ToolServer>,
    tools: Vec<McpTool>,
}

impl<'a> ToolRouter<'a> {
    pub fn new(servers: &[&'a dyn ToolServer]) -> Self {
        let mut routes: HashMap<String, &'a dyn ToolServer> = HashMap::new();
        let mut tools = Vec::new();

        for server in servers {
            for tool in server.tools() {
                if let Some(owner) = routes.get(&tool.name) {
                    tracing::warn!(
                        "Tool '{}' from '{}' shadowed by '{}'",
                        tool.name,
                        server.name(),
                        owner.name()
                    );
                    continue;
                }
                routes.insert(tool.name.clone(), *server);
                tools.push(tool.clone());
            }
        }

        Self { routes, tools }
    }

    pub fn server_for(&self, tool: &str) -> Option<&'a dyn ToolServer> {
        self.routes.get(tool).copied()
    }

    pub fn definitions(&self) -> Vec<FunctionTool> {
        function_tools(&self.tools)
    }
}
