//! Models command - known models and the ones each mode uses

use super::{CommandContext, CommandResult, SlashCommand};
use crate::config::Settings;
use anyhow::Result;
use async_trait::async_trait;

/// Models command
pub struct ModelsCommand;

/// Render the model list, marking the build and ask models
pub fn render_models(settings: &Settings) -> String {
    let mut text = String::from("Available models:\n\n");

    let mut listed = settings.available_models.clone();
    for in_use in [&settings.default_model, &settings.ask_model] {
        if !listed.contains(in_use) {
            listed.push(in_use.clone());
        }
    }

    for model in &listed {
        let mut marks = Vec::new();
        if *model == settings.default_model {
            marks.push("build");
        }
        if *model == settings.ask_model {
            marks.push("ask");
        }
        if marks.is_empty() {
            text.push_str(&format!("  {}\n", model));
        } else {
            text.push_str(&format!("  {} [{}]\n", model, marks.join(", ")));
        }
    }

    text
}

#[async_trait]
impl SlashCommand for ModelsCommand {
    fn name(&self) -> &'static str {
        "models"
    }

    fn description(&self) -> &'static str {
        "List known models and the model used by each mode"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["m"]
    }

    async fn execute(&self, _args: &str, ctx: &CommandContext<'_>) -> Result<CommandResult> {
        Ok(CommandResult::Message(render_models(ctx.session.settings())))
    }
}
