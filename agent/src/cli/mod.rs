//! CLI module
//!
//! - Argument definitions (args)
//! - Slash commands for the interactive session (commands)
//! - The interactive loop (repl)

pub mod args;
pub mod commands;
pub mod repl;

pub use args::{Cli, Commands};
pub use commands::{CommandContext, CommandRegistry, CommandResult, SlashCommand};
pub use repl::Repl;
