//! Tool-server handles
//!
//! A [`ToolServer`] is a running MCP server owned by one chat session. It is
//! produced by a [`ServerLauncher`] and must be stopped exactly once; the
//! [`McpServerSet`](super::McpServerSet) enforces that.

use std::time::Duration;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParam, RawContent},
    service::RunningService,
    transport::TokioChildProcess,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::process::Command;

use super::error::McpServerError;
use super::types::{McpServerDescriptor, McpTool};

/// A started tool server
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Name from the config file
    fn name(&self) -> &str;

    /// Tools discovered when the server started
    fn tools(&self) -> &[McpTool];

    /// Call one of this server's tools and return its text output
    async fn call_tool(&self, tool: &str, arguments: Option<Value>) -> Result<String, McpServerError>;

    /// Tear the server down. Called once by the owning set.
    async fn stop(&mut self) -> Result<(), McpServerError>;
}

/// Something that can turn a descriptor into a running server
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    async fn launch(
        &self,
        descriptor: &McpServerDescriptor,
    ) -> Result<Box<dyn ToolServer>, McpServerError>;
}

// =============================================================================
// Child-process launcher
// =============================================================================

/// Default startup timeout for spawning and initializing an MCP server
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Launches each descriptor as a stdio child process
pub struct ChildProcessLauncher {
    startup_timeout: Duration,
}

impl Default for ChildProcessLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_STARTUP_TIMEOUT)
    }
}

impl ChildProcessLauncher {
    pub fn new(startup_timeout: Duration) -> Self {
        Self { startup_timeout }
    }

    fn command(descriptor: &McpServerDescriptor) -> Command {
        let mut cmd = Command::new(&descriptor.command);
        if !descriptor.args.is_empty() {
            cmd.args(&descriptor.args);
        }
        for (key, value) in &descriptor.env {
            let expanded = shellexpand::env(value).unwrap_or_else(|_| value.clone().into());
            cmd.env(key, expanded.as_ref());
        }
        cmd
    }
}

#[async_trait]
impl ServerLauncher for ChildProcessLauncher {
    async fn launch(
        &self,
        descriptor: &McpServerDescriptor,
    ) -> Result<Box<dyn ToolServer>, McpServerError> {
        let name = descriptor.name.as_str();
        tracing::debug!("Starting MCP server: {} ({})", name, descriptor.command);

        let cmd = Self::command(descriptor);

        // Wrap spawn + initialization in startup timeout
        let service = tokio::time::timeout(self.startup_timeout, async {
            let transport = TokioChildProcess::new(cmd).map_err(|source| McpServerError::Spawn {
                name: name.to_string(),
                source,
            })?;
            ().serve(transport)
                .await
                .map_err(|e| McpServerError::Initialize {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        })
        .await
        .map_err(|_| McpServerError::StartupTimeout {
            name: name.to_string(),
            timeout: self.startup_timeout,
        })??;

        let listed = service.list_tools(Default::default()).await;
        let tools = match listed {
            Ok(response) => response
                .tools
                .into_iter()
                .map(|t| McpTool {
                    server: name.to_string(),
                    name: t.name.to_string(),
                    description: t.description.map(|d| d.to_string()),
                    input_schema: Some(serde_json::to_value(&t.input_schema).unwrap_or_default()),
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                // Already running: release it before reporting the failure
                if let Err(cancel_err) = service.cancel().await {
                    tracing::warn!("Failed to cancel MCP server '{}': {}", name, cancel_err);
                }
                return Err(McpServerError::Initialize {
                    name: name.to_string(),
                    reason: format!("failed to list tools: {}", e),
                });
            }
        };

        tracing::info!("Server '{}': {} tools", name, tools.len());

        Ok(Box::new(McpServerHandle {
            name: name.to_string(),
            service: Some(service),
            tools,
        }))
    }
}

// =============================================================================
// Running handle
// =============================================================================

/// A child-process MCP server with an initialized client session
pub struct McpServerHandle {
    name: String,
    service: Option<RunningService<RoleClient, ()>>,
    tools: Vec<McpTool>,
}

#[async_trait]
impl ToolServer for McpServerHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    async fn call_tool(&self, tool: &str, arguments: Option<Value>) -> Result<String, McpServerError> {
        let service = self.service.as_ref().ok_or_else(|| McpServerError::NotRunning {
            name: self.name.clone(),
        })?;

        let args = arguments.and_then(|v| v.as_object().cloned());
        let result = service
            .call_tool(CallToolRequestParam {
                name: tool.to_string().into(),
                arguments: args,
                task: None,
            })
            .await
            .map_err(|e| McpServerError::ToolCall {
                server: self.name.clone(),
                tool: tool.to_string(),
                reason: e.to_string(),
            })?;

        let mut output = String::new();
        for content in &result.content {
            if !output.is_empty() {
                output.push('\n');
            }
            match &content.raw {
                RawContent::Text(text) => output.push_str(&text.text),
                _ => output.push_str(&format!("{:?}", content)),
            }
        }

        if result.is_error.unwrap_or(false) {
            return Err(McpServerError::ToolCall {
                server: self.name.clone(),
                tool: tool.to_string(),
                reason: output,
            });
        }

        Ok(output)
    }

    async fn stop(&mut self) -> Result<(), McpServerError> {
        let service = self.service.take().ok_or_else(|| McpServerError::NotRunning {
            name: self.name.clone(),
        })?;

        service
            .cancel()
            .await
            .map(|reason| tracing::debug!("MCP server '{}' stopped: {:?}", self.name, reason))
            .map_err(|e| McpServerError::Stop {
                name: self.name.clone(),
                reason: e.to_string(),
            })
    }
}
