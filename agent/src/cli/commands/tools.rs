//! Tools command - tools the agent can use in the current mode

use super::{CommandContext, CommandResult, SlashCommand};
use crate::agent::assemble;
use anyhow::Result;
use async_trait::async_trait;

/// Tools command
pub struct ToolsCommand;

#[async_trait]
impl SlashCommand for ToolsCommand {
    fn name(&self) -> &'static str {
        "tools"
    }

    fn description(&self) -> &'static str {
        "List tools available in the current mode (/tools <server> to filter)"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["t"]
    }

    async fn execute(&self, args: &str, ctx: &CommandContext<'_>) -> Result<CommandResult> {
        let session = ctx.session;
        let agent = assemble(session.mode(), session.settings(), session.servers().active());
        let filter = args.trim();

        let mut text = String::new();
        let mut count = 0;
        for server in &agent.servers {
            if !filter.is_empty() && !server.name().eq_ignore_ascii_case(filter) {
                continue;
            }
            for tool in server.tools() {
                count += 1;
                text.push_str(&format!("  {}/{}\n", server.name(), tool.name));
                if let Some(first_line) = tool.description.as_deref().and_then(|d| d.lines().next()) {
                    text.push_str(&format!("    {}\n", first_line));
                }
            }
        }

        if count == 0 {
            return Ok(CommandResult::Message(format!(
                "No tools available in {} mode.",
                session.mode()
            )));
        }

        Ok(CommandResult::Message(format!(
            "Tools in {} mode ({}):\n\n{}",
            session.mode(),
            count,
            text
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{session, CaptureOutput};
    use super::*;
    use crate::agent::ChatMode;

    #[tokio::test]
    async fn test_no_tools_without_servers() {
        let session = session(ChatMode::Ask);
        let output = CaptureOutput::default();
        let ctx = CommandContext {
            session: &session,
            output: &output,
        };

        let result = ToolsCommand.execute("", &ctx).await.unwrap();
        assert_eq!(
            result,
            CommandResult::Message("No tools available in ask mode.".to_string())
        );
    }
}
