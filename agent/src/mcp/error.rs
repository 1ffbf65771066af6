//! Error types for MCP configuration and tool-server lifecycle

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal errors while loading the MCP server config file
#[derive(Error, Debug)]
pub enum McpConfigError {
    /// The config file does not exist
    #[error("MCP config not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read
    #[error("failed to read MCP config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not JSON, or its top level does not have the expected shape
    #[error("malformed MCP config {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Errors from starting, using or stopping a single tool server
#[derive(Error, Debug)]
pub enum McpServerError {
    /// The process could not be spawned
    #[error("failed to spawn MCP server '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The MCP handshake or tool discovery failed
    #[error("MCP server '{name}' failed to initialize: {reason}")]
    Initialize { name: String, reason: String },

    /// Spawn plus initialization took longer than the startup timeout
    #[error("MCP server '{name}' startup timed out after {timeout:?}")]
    StartupTimeout { name: String, timeout: Duration },

    /// A tool call failed at the protocol level
    #[error("tool '{tool}' on MCP server '{server}' failed: {reason}")]
    ToolCall {
        server: String,
        tool: String,
        reason: String,
    },

    /// Tearing the server down failed
    #[error("failed to stop MCP server '{name}': {reason}")]
    Stop { name: String, reason: String },

    /// The server was already stopped
    #[error("MCP server '{name}' is not running")]
    NotRunning { name: String },
}
