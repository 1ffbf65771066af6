//! Servers command - running MCP servers and start failures

use super::{CommandContext, CommandResult, SlashCommand};
use crate::agent::ChatMode;
use anyhow::Result;
use async_trait::async_trait;

/// Servers command
pub struct ServersCommand;

#[async_trait]
impl SlashCommand for ServersCommand {
    fn name(&self) -> &'static str {
        "servers"
    }

    fn description(&self) -> &'static str {
        "List running MCP servers"
    }

    async fn execute(&self, _args: &str, ctx: &CommandContext<'_>) -> Result<CommandResult> {
        let servers = ctx.session.servers();
        let docs_server = &ctx.session.settings().docs_server;

        if servers.is_empty() && servers.failures().is_empty() {
            return Ok(CommandResult::Message("No MCP servers running.".to_string()));
        }

        let mut text = format!("MCP servers ({} running):\n\n", servers.len());
        for server in servers.active() {
            let scope = if server.name().eq_ignore_ascii_case(docs_server) {
                "build, ask"
            } else {
                ChatMode::Build.label()
            };
            text.push_str(&format!(
                "  {:<24} {:>3} tools  [{}]\n",
                server.name(),
                server.tools().len(),
                scope
            ));
        }
        for failure in servers.failures() {
            text.push_str(&format!("  {:<24} failed: {}\n", failure.name, failure.error));
        }

        Ok(CommandResult::Message(text))
    }
}
