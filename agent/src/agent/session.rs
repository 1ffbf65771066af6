//! Per-session chat state
//!
//! A [`ChatSession`] owns the conversation history and the tool servers
//! started for it. Turns are delegated to an [`AgentRuntime`]; the session
//! only forwards what the runtime streams and records the outcome.

use std::sync::Arc;

use futures_util::StreamExt;

use super::mode::{assemble, ChatMode};
use crate::config::Settings;
use crate::llm::{AgentRuntime, Message, Role, RunEvent, RuntimeError};
use crate::mcp::{McpConfig, McpConfigError, McpServerSet, ServerLauncher, ShutdownReport};
use crate::output::{OutputEvent, OutputWriter};

/// Assistant entry recorded in history when a turn fails
pub const ERROR_SENTINEL: &str = "[error: no response was generated for this message]";

/// Shown to the user when a turn fails
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, something went wrong while generating a response. Please try again.";

/// Printed when a turn succeeds with no text
pub const EMPTY_RESPONSE_MESSAGE: &str = "(No response generated)";

/// One chat session: mode, history and running tool servers
pub struct ChatSession {
    settings: Arc<Settings>,
    mode: ChatMode,
    history: Vec<Message>,
    servers: McpServerSet,
}

impl ChatSession {
    pub fn new(settings: Arc<Settings>, mode: ChatMode, servers: McpServerSet) -> Self {
        Self {
            settings,
            mode,
            history: Vec::new(),
            servers,
        }
    }

    /// A session with no tool servers
    pub fn without_tools(settings: Arc<Settings>, mode: ChatMode) -> Self {
        Self::new(settings, mode, McpServerSet::empty())
    }

    /// Load the MCP config and start its servers.
    ///
    /// A config that is missing or unreadable is fatal. Individual entries
    /// and servers that fail are reported and left out.
    pub async fn open(
        settings: Arc<Settings>,
        mode: ChatMode,
        launcher: &dyn ServerLauncher,
        output: &dyn OutputWriter,
    ) -> Result<Self, McpConfigError> {
        let config = McpConfig::load_from_path(&settings.mcp_config_path)?;

        output.write(OutputEvent::Progress {
            message: format!(
                "Loaded {} MCP server definition(s) from {}",
                config.servers.len(),
                settings.mcp_config_path.display()
            ),
            done: true,
        });
        for skipped in &config.skipped {
            output.write(OutputEvent::Warning(format!(
                "Skipping MCP server '{}': {}",
                skipped.name, skipped.reason
            )));
        }

        let servers = McpServerSet::start_all(launcher, &config.servers).await;

        for server in servers.active() {
            output.write(OutputEvent::Progress {
                message: format!("Started '{}' ({} tools)", server.name(), server.tools().len()),
                done: true,
            });
        }
        for failure in servers.failures() {
            output.write(OutputEvent::Warning(format!(
                "Could not start '{}': {}",
                failure.name, failure.error
            )));
        }
        if !config.servers.is_empty() && servers.is_empty() {
            output.write(OutputEvent::Warning(
                "No MCP servers started; continuing without tools".to_string(),
            ));
        }

        Ok(Self::new(settings, mode, servers))
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ChatMode) {
        if mode != self.mode {
            tracing::info!("Switching chat mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn servers(&self) -> &McpServerSet {
        &self.servers
    }

    /// Run one turn: stream the answer to `output` and record it.
    ///
    /// On failure the apology is shown, [`ERROR_SENTINEL`] is recorded in
    /// place of any partial text and the error is returned.
    pub async fn run_turn(
        &mut self,
        runtime: &dyn AgentRuntime,
        input: &str,
        output: &dyn OutputWriter,
    ) -> Result<String, RuntimeError> {
        self.history.push(Message::user(input));

        let outcome = {
            let agent = assemble(self.mode, &self.settings, self.servers.active());
            let mut stream = runtime.run_streamed(&agent, &self.history);
            let mut response = String::new();
            let mut failure = None;

            while let Some(event) = stream.next().await {
                match event {
                    Ok(RunEvent::TextDelta(text)) => {
                        response.push_str(&text);
                        output.write(OutputEvent::Token(text));
                    }
                    Ok(RunEvent::ToolStarted {
                        server,
                        name,
                        arguments,
                    }) => output.write(OutputEvent::ToolStart {
                        server,
                        name,
                        arguments,
                    }),
                    Ok(RunEvent::ToolFinished {
                        name,
                        result,
                        duration,
                        is_error,
                    }) => output.write(OutputEvent::ToolComplete {
                        name,
                        result,
                        duration,
                        is_error,
                    }),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            match failure {
                Some(e) => Err(e),
                None => Ok(response),
            }
        };

        match outcome {
            Ok(response) => {
                if response.trim().is_empty() {
                    output.write(OutputEvent::Text(EMPTY_RESPONSE_MESSAGE.to_string()));
                } else {
                    output.write(OutputEvent::NewLine);
                }
                output.flush();
                self.history.push(Message::assistant(response.clone()));
                Ok(response)
            }
            Err(e) => {
                tracing::error!("Turn failed in {} mode: {}", self.mode, e);
                output.write(OutputEvent::NewLine);
                output.write(OutputEvent::Error(GENERIC_ERROR_MESSAGE.to_string()));
                output.flush();
                self.history.push(Message::assistant(ERROR_SENTINEL));
                Err(e)
            }
        }
    }

    /// Record a turn abandoned mid-stream.
    ///
    /// A user message left without an answer gets [`ERROR_SENTINEL`] so the
    /// history keeps alternating.
    pub fn record_interrupted(&mut self) {
        if self.history.last().is_some_and(|m| m.role == Role::User) {
            tracing::warn!("Turn interrupted in {} mode", self.mode);
            self.history.push(Message::assistant(ERROR_SENTINEL));
        }
    }

    /// End the session, stopping every running tool server once
    pub async fn close(mut self, output: &dyn OutputWriter) -> ShutdownReport {
        let report = self.servers.shutdown().await;

        for (name, error) in &report.failed {
            output.write(OutputEvent::Warning(format!(
                "Failed to stop '{}': {}",
                name, error
            )));
        }
        if report.attempted() > 0 {
            output.write(OutputEvent::Status(format!(
                "Stopped {}/{} MCP server(s)",
                report.stopped.len(),
                report.attempted()
            )));
        }

        report
    }
}
