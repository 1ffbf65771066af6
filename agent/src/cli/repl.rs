//! REPL (Read-Eval-Print Loop) for interactive chat
//!
//! Reads lines, dispatches slash commands and runs everything else as a
//! chat turn. The session is always closed when the loop ends, whether by
//! `quit`, end of input, Ctrl-C or an I/O error.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

use super::commands::{CommandContext, CommandRegistry, CommandResult};
use crate::agent::ChatSession;
use crate::llm::AgentRuntime;
use crate::mcp::ShutdownReport;
use crate::output::{OutputEvent, OutputWriter};

/// Interactive REPL over one chat session
pub struct Repl<'a> {
    session: ChatSession,
    runtime: &'a dyn AgentRuntime,
    output: &'a dyn OutputWriter,
    registry: CommandRegistry,
    interrupt: Arc<Notify>,
}

impl<'a> Repl<'a> {
    pub fn new(session: ChatSession, runtime: &'a dyn AgentRuntime, output: &'a dyn OutputWriter) -> Self {
        Self {
            session,
            runtime,
            output,
            registry: CommandRegistry::new(),
            interrupt: Arc::new(Notify::new()),
        }
    }

    /// Also stop when `interrupt` is notified, the same way as on Ctrl-C
    pub fn with_interrupt(mut self, interrupt: Arc<Notify>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Run on stdin until the user leaves, then tear the session down
    pub async fn run(self) -> Result<ShutdownReport> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Run on any line source, then tear the session down
    pub async fn run_with<R>(mut self, reader: R) -> Result<ShutdownReport>
    where
        R: AsyncBufRead + Unpin,
    {
        let loop_result = self.read_loop(reader).await;
        if let Err(e) = &loop_result {
            tracing::error!("Chat loop ended with error: {:#}", e);
        }

        let report = self.session.close(self.output).await;
        loop_result.map(|()| report)
    }

    async fn read_loop<R>(&mut self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.output.write(OutputEvent::System(format!(
            "{} ({} mode). Type /help for commands, 'quit' to exit.",
            self.session.settings().agent_name,
            self.session.mode()
        )));
        self.output.write(OutputEvent::NewLine);

        let mut lines = reader.lines();

        loop {
            print!("{}> ", self.session.mode());
            io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                () = interrupted(&self.interrupt) => {
                    self.output.write(OutputEvent::NewLine);
                    None
                }
            };

            // End of input
            let Some(line) = line else {
                break;
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input == "quit" || input == "exit" {
                break;
            }

            if CommandRegistry::is_command(input) {
                self.handle_command(input).await;
                continue;
            }

            let (runtime, output) = (self.runtime, self.output);
            let turn = tokio::select! {
                result = self.session.run_turn(runtime, input, output) => Some(result),
                () = interrupted(&self.interrupt) => None,
            };

            match turn {
                // Failures were already reported to the user and recorded in history
                Some(Err(e)) => tracing::debug!("Turn error: {}", e),
                Some(Ok(_)) => {}
                None => {
                    self.session.record_interrupted();
                    self.output.write(OutputEvent::NewLine);
                    self.output
                        .write(OutputEvent::Warning("Interrupted; ending session".to_string()));
                    break;
                }
            }
            self.output.write(OutputEvent::NewLine);
        }

        Ok(())
    }

    async fn handle_command(&mut self, input: &str) {
        let result = {
            let ctx = CommandContext {
                session: &self.session,
                output: self.output,
            };
            self.registry.try_execute(input, &ctx).await
        };

        match result {
            None | Some(Ok(CommandResult::Ok)) => {}
            Some(Ok(CommandResult::Message(msg))) => {
                self.output.write(OutputEvent::Text(msg));
            }
            Some(Ok(CommandResult::SwitchMode(mode))) => {
                self.session.set_mode(mode);
                self.output
                    .write(OutputEvent::Status(format!("Switched to {} mode", mode)));
            }
            Some(Err(e)) => {
                self.output
                    .write(OutputEvent::Error(format!("Command error: {:#}", e)));
            }
        }
        self.output.write(OutputEvent::NewLine);
    }
}

/// Resolves on Ctrl-C or when the interrupt handle is notified
async fn interrupted(interrupt: &Notify) {
    tokio::select! {
        Ok(()) = tokio::signal::ctrl_c() => {}
        () = interrupt.notified() => {}
    }
}
