//! Terminal output with colors and formatting
//!
//! Uses ANSI escape codes for colors and styling.

use std::io::{self, Write};

use super::{format_arguments, preview, OutputEvent, OutputWriter};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";

/// Terminal output writer with colors
pub struct TerminalOutput {
    use_colors: bool,
    /// Show tool result previews
    verbose: bool,
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    pub fn without_colors() -> Self {
        Self {
            use_colors: false,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn styled(&self, codes: &[&str], text: &str) -> String {
        if self.use_colors {
            let prefix: String = codes.concat();
            format!("{}{}{}", prefix, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn tool_start_line(&self, server: &str, name: &str, arguments: &serde_json::Value) -> String {
        let mut line = format!("  {} ", self.color(GRAY, "→"));
        if !server.is_empty() {
            line.push_str(&self.color(GRAY, &format!("{}/", server)));
        }
        line.push_str(&self.styled(&[BOLD, CYAN], name));

        let args = format_arguments(arguments);
        if !args.is_empty() {
            line.push(' ');
            line.push_str(&self.color(GRAY, &args));
        }
        line
    }

    fn tool_complete_line(&self, name: &str, result: &str, millis: u128, is_error: bool) -> String {
        let status = if is_error {
            self.color(RED, "✗")
        } else {
            self.color(GREEN, "✓")
        };
        let time = self.color(GRAY, &format!("({}ms)", millis));
        let mut line = format!("  {} {} {}", status, name, time);

        if self.verbose || is_error {
            let shown = preview(result, 100);
            line.push(' ');
            line.push_str(&self.color(if is_error { RED } else { GRAY }, &shown));
        }
        line
    }
}

impl OutputWriter for TerminalOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Text(text) => println!("{}", text),

            OutputEvent::Token(token) => {
                print!("{}", token);
                let _ = io::stdout().flush();
            }

            OutputEvent::ToolStart {
                server,
                name,
                arguments,
            } => {
                // Keep tool lines off the answer line being streamed
                let _ = io::stdout().flush();
                eprintln!("{}", self.tool_start_line(&server, &name, &arguments));
            }

            OutputEvent::ToolComplete {
                name,
                result,
                duration,
                is_error,
            } => {
                eprintln!(
                    "{}",
                    self.tool_complete_line(&name, &result, duration.as_millis(), is_error)
                );
            }

            OutputEvent::Progress { message, done } => {
                let marker = if done {
                    self.color(GREEN, "✓")
                } else {
                    self.color(BLUE, "⋯")
                };
                eprintln!("  {} {}", marker, self.color(GRAY, &message));
            }

            OutputEvent::Status(msg) => eprintln!("{}", self.color(GRAY, &format!("  {}", msg))),

            OutputEvent::Error(msg) => eprintln!(
                "{} {}",
                self.styled(&[BOLD, RED], "Error:"),
                self.color(RED, &msg)
            ),

            OutputEvent::Warning(msg) => eprintln!(
                "{} {}",
                self.styled(&[BOLD, YELLOW], "Warning:"),
                self.color(YELLOW, &msg)
            ),

            OutputEvent::System(msg) => eprintln!("{}", self.color(GRAY, &msg)),

            OutputEvent::NewLine => println!(),
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }

    fn supports_colors(&self) -> bool {
        self.use_colors
    }
}
