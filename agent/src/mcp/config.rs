//! MCP server configuration (from .mcp.json)
//!
//! The file must be a JSON object with an `mcpServers` object. Each entry is
//! validated on its own: a bad entry is skipped with a warning and the rest
//! still load.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::error::McpConfigError;
use super::types::McpServerDescriptor;

const SERVERS_KEY: &str = "mcpServers";

/// Wire shape of a single server entry
#[derive(Debug, Deserialize)]
struct ServerEntry {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
}

/// An entry that was present in the file but could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Result of loading the config: usable descriptors plus skipped entries
#[derive(Debug, Clone, Default)]
pub struct McpConfig {
    pub servers: Vec<McpServerDescriptor>,
    pub skipped: Vec<SkippedEntry>,
}

impl McpConfig {
    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, McpConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(McpConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(McpConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        tracing::debug!("Loading MCP config from: {}", path.display());
        Self::from_json_str(&content, path)
    }

    /// Parse config text; `origin` is only used in error messages
    pub fn from_json_str(content: &str, origin: &Path) -> Result<Self, McpConfigError> {
        let malformed = |reason: String| McpConfigError::Malformed {
            path: origin.to_path_buf(),
            reason,
        };

        let root: Value =
            serde_json::from_str(content).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

        let root = root
            .as_object()
            .ok_or_else(|| malformed(format!("top level must be an object, found {}", kind(&root))))?;

        let servers = root
            .get(SERVERS_KEY)
            .ok_or_else(|| malformed(format!("missing '{}' key", SERVERS_KEY)))?;

        let servers = servers.as_object().ok_or_else(|| {
            malformed(format!(
                "'{}' must be an object, found {}",
                SERVERS_KEY,
                kind(servers)
            ))
        })?;

        let mut config = McpConfig::default();

        for (name, entry) in servers {
            match parse_entry(name, entry) {
                Ok(descriptor) => config.servers.push(descriptor),
                Err(reason) => {
                    tracing::warn!("Skipping MCP server '{}': {}", name, reason);
                    config.skipped.push(SkippedEntry {
                        name: name.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            "MCP config: {} server(s) loaded, {} skipped",
            config.servers.len(),
            config.skipped.len()
        );

        Ok(config)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

fn parse_entry(name: &str, entry: &Value) -> Result<McpServerDescriptor, String> {
    if name.trim().is_empty() {
        return Err("server name is empty".to_string());
    }
    if !entry.is_object() {
        return Err(format!("entry must be an object, found {}", kind(entry)));
    }

    let entry: ServerEntry = ServerEntry::deserialize(entry).map_err(|e| e.to_string())?;

    if entry.command.trim().is_empty() {
        return Err("'command' is empty".to_string());
    }

    Ok(McpServerDescriptor {
        name: name.to_string(),
        command: entry.command,
        args: entry.args,
        env: entry.env,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<McpConfig, McpConfigError> {
        McpConfig::from_json_str(json, Path::new("test.json"))
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = McpConfig::load_from_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, McpConfigError::NotFound { .. }));
    }

    #[test]
    fn test_unreadable_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file
        let err = McpConfig::load_from_path(dir.path()).unwrap_err();
        assert!(matches!(err, McpConfigError::Read { .. }), "got {:?}", err);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mcp.json");
        std::fs::write(
            &path,
            r#"{"mcpServers": {"context7": {"command": "npx", "args": ["-y", "@upstash/context7-mcp@latest"]}}}"#,
        )
        .unwrap();

        let config = McpConfig::load_from_path(&path).unwrap();
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].name, "context7");
        assert_eq!(config.servers[0].command, "npx");
        assert_eq!(config.servers[0].args, vec!["-y", "@upstash/context7-mcp@latest"]);
        assert!(config.skipped.is_empty());
    }

    #[test]
    fn test_servers_key_not_an_object_is_malformed() {
        let err = parse(r#"{"mcpServers": ["context7"]}"#).unwrap_err();
        assert!(matches!(err, McpConfigError::Malformed { .. }));

        let err = parse(r#"{"mcpServers": "context7"}"#).unwrap_err();
        assert!(matches!(err, McpConfigError::Malformed { .. }));
    }

    #[test]
    fn test_top_level_shape_errors_are_malformed() {
        for json in ["[]", "42", "{}", "{not json"] {
            let err = parse(json).unwrap_err();
            assert!(
                matches!(err, McpConfigError::Malformed { .. }),
                "expected Malformed for {}",
                json
            );
        }
    }

    #[test]
    fn test_invalid_entry_is_skipped_others_load() {
        let config = parse(
            r#"{
                "mcpServers": {
                    "context7": {"command": "npx", "args": ["-y", "@upstash/context7-mcp@latest"]},
                    "broken": {"args": ["no", "command"]},
                    "sequential-thinking": {"command": "npx", "args": ["-y", "@modelcontextprotocol/server-sequential-thinking"]}
                }
            }"#,
        )
        .unwrap();

        let names: Vec<_> = config.servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["context7", "sequential-thinking"]);
        assert_eq!(config.skipped.len(), 1);
        assert_eq!(config.skipped[0].name, "broken");
    }

    #[test]
    fn test_entry_validation_reasons() {
        let config = parse(
            r#"{
                "mcpServers": {
                    "blank": {"command": "  "},
                    "not-object": "npx",
                    "bad-args": {"command": "npx", "args": "-y"},
                    "bad-env": {"command": "npx", "env": {"TOKEN": 5}}
                }
            }"#,
        )
        .unwrap();

        assert!(config.servers.is_empty());
        assert!(config.is_empty());
        assert_eq!(config.skipped.len(), 4);
        let blank = config.skipped.iter().find(|s| s.name == "blank").unwrap();
        assert!(blank.reason.contains("empty"));
        let not_object = config.skipped.iter().find(|s| s.name == "not-object").unwrap();
        assert!(not_object.reason.contains("a string"));
    }

    #[test]
    fn test_args_and_env_default_to_empty() {
        let config = parse(r#"{"mcpServers": {"local": {"command": "./server"}}}"#).unwrap();
        assert!(config.servers[0].args.is_empty());
        assert!(config.servers[0].env.is_empty());
    }

    #[test]
    fn test_extra_keys_are_tolerated() {
        let config = parse(
            r#"{"version": 2, "mcpServers": {"x": {"command": "x", "tier": 1, "env": {"A": "$HOME"}}}}"#,
        )
        .unwrap();
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].env.get("A").map(String::as_str), Some("$HOME"));
    }
}
