//! Help command - displays available commands

use super::{CommandContext, CommandRegistry, CommandResult, SlashCommand};
use crate::output::OutputEvent;
use anyhow::Result;
use async_trait::async_trait;

/// Help command
pub struct HelpCommand;

impl HelpCommand {
    fn render(registry: &CommandRegistry) -> String {
        let mut help_text = String::from("Available commands:\n\n");

        for cmd in registry.all_commands() {
            let aliases = cmd.aliases();
            let alias_str = if aliases.is_empty() {
                String::new()
            } else {
                let list: Vec<String> = aliases.iter().map(|a| format!("/{}", a)).collect();
                format!(" ({})", list.join(", "))
            };

            help_text.push_str(&format!(
                "  /{:<12} {}{}\n",
                cmd.name(),
                cmd.description(),
                alias_str
            ));
        }

        help_text.push_str("\n  quit, exit    End the session\n");
        help_text
    }
}

#[async_trait]
impl SlashCommand for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show available commands"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["h", "?"]
    }

    async fn execute(&self, _args: &str, ctx: &CommandContext<'_>) -> Result<CommandResult> {
        ctx.output
            .write(OutputEvent::Text(Self::render(&CommandRegistry::new())));
        Ok(CommandResult::Ok)
    }
}
