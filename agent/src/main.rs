use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use axiom::agent::{ChatMode, ChatSession};
use axiom::cli::commands::render_models;
use axiom::cli::{Cli, Commands, Repl};
use axiom::config::Settings;
use axiom::llm::OpenAiRuntime;
use axiom::mcp::{ChildProcessLauncher, McpConfig};
use axiom::output::{select_output, OutputEvent, OutputWriter};

/// Logs go to stderr; stdout carries the streamed answer
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Allow RUST_LOG to override if set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Settings from files and environment, then CLI overrides
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load().context("Failed to load settings")?;

    if let Some(model) = &cli.model {
        settings.default_model = model.clone();
        settings.ask_model = model.clone();
    }
    if let Some(path) = &cli.mcp_config {
        settings.mcp_config_path = path.clone();
    }

    Ok(settings)
}

async fn open_session(cli: &Cli, settings: Arc<Settings>, output: &dyn OutputWriter) -> Result<ChatSession> {
    let mode = ChatMode::from_label(&cli.mode);

    if cli.no_tools {
        output.write(OutputEvent::Status("Tools disabled; chatting without MCP servers".to_string()));
        return Ok(ChatSession::without_tools(settings, mode));
    }

    let launcher = ChildProcessLauncher::new(settings.startup_timeout);
    ChatSession::open(settings, mode, &launcher, output)
        .await
        .context("Cannot start the agent: MCP server configuration is unavailable (use --no-tools to chat without tools)")
}

async fn run_chat(cli: &Cli, settings: Arc<Settings>, output: &dyn OutputWriter) -> Result<()> {
    let runtime = OpenAiRuntime::from_settings(&settings).context("Cannot reach the model")?;
    let session = open_session(cli, settings, output).await?;

    let report = Repl::new(session, &runtime, output).run().await?;
    tracing::info!(
        "Session closed: {} stopped, {} failed",
        report.stopped.len(),
        report.failed.len()
    );
    Ok(())
}

async fn run_ask(cli: &Cli, settings: Arc<Settings>, message: &str, output: &dyn OutputWriter) -> Result<()> {
    let runtime = OpenAiRuntime::from_settings(&settings).context("Cannot reach the model")?;
    let mut session = open_session(cli, settings, output).await?;

    let outcome = session.run_turn(&runtime, message, output).await;
    session.close(output).await;

    outcome.context("Agent run failed")?;
    Ok(())
}

fn show_servers(settings: &Settings, output: &dyn OutputWriter) -> Result<()> {
    let path = &settings.mcp_config_path;
    let config = McpConfig::load_from_path(path)
        .with_context(|| format!("Failed to load MCP config from {}", path.display()))?;

    let mut text = format!("MCP servers in {} ({}):\n\n", path.display(), config.servers.len());
    for server in &config.servers {
        let scope = if server.name.eq_ignore_ascii_case(&settings.docs_server) {
            "build, ask"
        } else {
            "build"
        };
        text.push_str(&format!(
            "  {:<24} {} {}  [{}]\n",
            server.name,
            server.command,
            server.args.join(" "),
            scope
        ));
    }
    for skipped in &config.skipped {
        text.push_str(&format!("  {:<24} skipped: {}\n", skipped.name, skipped.reason));
    }

    output.write(OutputEvent::Text(text));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI first to get verbosity before initializing tracing
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = select_output(cli.plain, cli.verbose > 0);
    let settings = Arc::new(load_settings(&cli)?);

    let result = match cli.command.clone().unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(&cli, settings, output.as_ref()).await,
        Commands::Ask { message } => run_ask(&cli, settings, &message, output.as_ref()).await,
        Commands::Servers => show_servers(&settings, output.as_ref()),
        Commands::Models => {
            output.write(OutputEvent::Text(render_models(&settings)));
            Ok(())
        }
    };

    output.flush();
    result
}
