//! Plain text output for pipes and CI environments

use std::io::{self, Write};

use super::{format_arguments, preview, OutputEvent, OutputWriter};

/// Plain text output writer (no colors)
#[derive(Default)]
pub struct PlainOutput {
    verbose: bool,
}

impl PlainOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show tool result previews
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn render(&self, event: &OutputEvent) -> Option<String> {
        let line = match event {
            OutputEvent::ToolStart {
                server,
                name,
                arguments,
            } => {
                let qualified = if server.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", server, name)
                };
                let args = format_arguments(arguments);
                if args.is_empty() {
                    format!("  -> {}", qualified)
                } else {
                    format!("  -> {} {}", qualified, args)
                }
            }
            OutputEvent::ToolComplete {
                name,
                result,
                duration,
                is_error,
            } => {
                let status = if *is_error { "FAIL" } else { "OK" };
                let mut line = format!("  {} {} ({}ms)", status, name, duration.as_millis());
                if self.verbose || *is_error {
                    line.push(' ');
                    line.push_str(&preview(result, 100));
                }
                line
            }
            OutputEvent::Progress { message, done } => {
                format!("  {} {}", if *done { "DONE" } else { "..." }, message)
            }
            OutputEvent::Status(msg) => format!("  {}", msg),
            OutputEvent::Error(msg) => format!("Error: {}", msg),
            OutputEvent::Warning(msg) => format!("Warning: {}", msg),
            OutputEvent::System(msg) => msg.clone(),
            OutputEvent::Text(_) | OutputEvent::Token(_) | OutputEvent::NewLine => return None,
        };
        Some(line)
    }
}

impl OutputWriter for PlainOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Text(text) => println!("{}", text),
            OutputEvent::Token(token) => {
                print!("{}", token);
                let _ = io::stdout().flush();
            }
            OutputEvent::NewLine => println!(),
            other => {
                if let Some(line) = self.render(&other) {
                    eprintln!("{}", line);
                }
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}
