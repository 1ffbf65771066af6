//! MCP (Model Context Protocol) tool servers
//!
//! Loads server definitions from .mcp.json, starts them as child processes
//! for the lifetime of a chat session and exposes their tools to the agent.

mod config;
mod error;
mod lifecycle;
mod server;
mod types;

pub use config::{McpConfig, SkippedEntry};
pub use error::{McpConfigError, McpServerError};
pub use lifecycle::{McpServerSet, ShutdownReport, StartFailure};
pub use server::{
    ChildProcessLauncher, McpServerHandle, ServerLauncher, ToolServer, DEFAULT_STARTUP_TIMEOUT,
};
pub use types::{McpServerDescriptor, McpTool};
