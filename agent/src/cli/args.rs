//! CLI argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "axiom")]
#[command(about = "Terminal chat agent with MCP tool servers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat mode: build (plan and build projects) or ask (documentation Q&A)
    #[arg(long, env = "AXIOM_MODE", default_value = "ask", global = true)]
    pub mode: String,

    /// Model to use in every mode (overrides the configured per-mode models)
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Path to the MCP server config (default: .mcp.json)
    #[arg(long, global = true)]
    pub mcp_config: Option<PathBuf>,

    /// Do not load or start any MCP servers
    #[arg(long, global = true)]
    pub no_tools: bool,

    /// Plain output without colors, even on a terminal
    #[arg(long, global = true)]
    pub plain: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive chat session (default)
    Chat,
    /// Send one message, print the answer and exit
    Ask {
        /// Message to send
        message: String,
    },
    /// Show the configured MCP servers without starting them
    Servers,
    /// List known models
    Models,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_interactive_chat() {
        let cli = Cli::try_parse_from(["axiom"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_tools);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "axiom",
            "ask",
            "what is tokio?",
            "--mode",
            "build",
            "--no-tools",
            "-vv",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Ask {
                message: "what is tokio?".to_string()
            })
        );
        assert_eq!(cli.mode, "build");
        assert!(cli.no_tools);
        assert_eq!(cli.verbose, 2);
    }
}
