//! Slash command system for interactive chat
//!
//! Commands like `/help` and `/mode build` are registered in a registry and
//! dispatched on the leading slash. Anything else is a chat message.

mod help;
mod mode;
mod models;
mod servers;
mod tools;

pub use help::HelpCommand;
pub use mode::ModeCommand;
pub use models::{render_models, ModelsCommand};
pub use servers::ServersCommand;
pub use tools::ToolsCommand;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::agent::{ChatMode, ChatSession};
use crate::output::OutputWriter;

// ============================================================================
// Command Context
// ============================================================================

/// Context passed to commands during execution
pub struct CommandContext<'a> {
    pub session: &'a ChatSession,
    pub output: &'a dyn OutputWriter,
}

// ============================================================================
// Command Result
// ============================================================================

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command wrote its own output
    Ok,
    /// Display this message
    Message(String),
    /// Switch the session to a new mode
    SwitchMode(ChatMode),
}

// ============================================================================
// SlashCommand Trait
// ============================================================================

#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Command name (without the leading slash)
    fn name(&self) -> &'static str;

    /// Short description for help text
    fn description(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    async fn execute(&self, args: &str, ctx: &CommandContext<'_>) -> Result<CommandResult>;
}

// ============================================================================
// Command Registry
// ============================================================================

/// Registry of slash commands
pub struct CommandRegistry {
    commands: Vec<Arc<dyn SlashCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create a registry with all built-in commands
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn SlashCommand>> = vec![
            Arc::new(HelpCommand),
            Arc::new(ModeCommand),
            Arc::new(ServersCommand),
            Arc::new(ToolsCommand),
            Arc::new(ModelsCommand),
        ];

        Self { commands }
    }

    /// Find a command by name or alias
    pub fn find(&self, name: &str) -> Option<&Arc<dyn SlashCommand>> {
        self.commands
            .iter()
            .find(|cmd| cmd.name() == name || cmd.aliases().contains(&name))
    }

    /// Check if input is a command (starts with /)
    pub fn is_command(input: &str) -> bool {
        input.starts_with('/')
    }

    /// Parse command input into (command_name, args)
    pub fn parse_command(input: &str) -> Option<(&str, &str)> {
        if !Self::is_command(input) {
            return None;
        }

        let input = input.trim_start_matches('/');
        let mut parts = input.splitn(2, char::is_whitespace);
        let name = parts.next()?;
        let args = parts.next().unwrap_or("").trim();

        Some((name, args))
    }

    pub fn all_commands(&self) -> &[Arc<dyn SlashCommand>] {
        &self.commands
    }

    /// Execute a command line.
    ///
    /// Returns `None` if the input is not a command.
    pub async fn try_execute(
        &self,
        input: &str,
        ctx: &CommandContext<'_>,
    ) -> Option<Result<CommandResult>> {
        let (name, args) = Self::parse_command(input)?;

        match self.find(name) {
            Some(cmd) => Some(cmd.execute(args, ctx).await),
            None => Some(Ok(CommandResult::Message(format!(
                "Unknown command: /{}. Type /help for available commands.",
                name
            )))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::output::OutputEvent;
    use std::sync::Mutex;

    /// Captures every event written
    #[derive(Default)]
    pub(crate) struct CaptureOutput {
        pub events: Mutex<Vec<OutputEvent>>,
    }

    impl OutputWriter for CaptureOutput {
        fn write(&self, event: OutputEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn flush(&self) {}
    }

    pub(crate) fn session(mode: ChatMode) -> ChatSession {
        ChatSession::without_tools(Arc::new(Settings::default()), mode)
    }

    #[test]
    fn test_is_command() {
        assert!(CommandRegistry::is_command("/help"));
        assert!(!CommandRegistry::is_command("hello /help"));
        assert!(!CommandRegistry::is_command(""));
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(CommandRegistry::parse_command("/help"), Some(("help", "")));
        assert_eq!(
            CommandRegistry::parse_command("/mode   build "),
            Some(("mode", "build"))
        );
        assert_eq!(CommandRegistry::parse_command("not a command"), None);
    }

    #[test]
    fn test_find_by_name_and_alias() {
        let registry = CommandRegistry::new();

        assert_eq!(registry.find("help").map(|c| c.name()), Some("help"));
        assert_eq!(registry.find("?").map(|c| c.name()), Some("help"));
        assert_eq!(registry.find("servers").map(|c| c.name()), Some("servers"));
        assert!(registry.find("nonexistent").is_none());
    }

    #[tokio::test]
    async fn test_unknown_command_message() {
        let registry = CommandRegistry::new();
        let session = session(ChatMode::Ask);
        let output = CaptureOutput::default();
        let ctx = CommandContext {
            session: &session,
            output: &output,
        };

        let result = registry.try_execute("/deploy", &ctx).await.unwrap().unwrap();
        assert!(matches!(result, CommandResult::Message(m) if m.contains("/deploy")));
        assert!(registry.try_execute("just chatting", &ctx).await.is_none());
    }
}
