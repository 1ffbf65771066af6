//! Mode command - show or switch the chat mode

use super::{CommandContext, CommandResult, SlashCommand};
use crate::agent::ChatMode;
use anyhow::Result;
use async_trait::async_trait;

/// Mode command
pub struct ModeCommand;

#[async_trait]
impl SlashCommand for ModeCommand {
    fn name(&self) -> &'static str {
        "mode"
    }

    fn description(&self) -> &'static str {
        "Show the chat mode or switch with /mode build|ask"
    }

    async fn execute(&self, args: &str, ctx: &CommandContext<'_>) -> Result<CommandResult> {
        let current = ctx.session.mode();

        match args.trim() {
            "" => Ok(CommandResult::Message(format!(
                "Current mode: {} (available: build, ask)",
                current
            ))),
            label => Ok(CommandResult::SwitchMode(ChatMode::from_label(label))),
        }
    }
}
