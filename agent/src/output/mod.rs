//! Output abstraction for the chat front-end
//!
//! Sessions and commands emit [`OutputEvent`]s; an [`OutputWriter`] decides
//! how they look. Streamed answer text goes to stdout, everything else to
//! stderr, so piping `axiom ask` captures only the answer.

use std::io::IsTerminal;
use std::time::Duration;

mod plain;
mod terminal;

pub use plain::PlainOutput;
pub use terminal::TerminalOutput;

// ============================================================================
// Output Events
// ============================================================================

/// Events that can be displayed to the user
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// A full line of content
    Text(String),

    /// A streamed fragment of the assistant's answer
    Token(String),

    /// The agent started a tool call
    ToolStart {
        server: String,
        name: String,
        arguments: serde_json::Value,
    },

    /// A tool call returned
    ToolComplete {
        name: String,
        result: String,
        duration: Duration,
        is_error: bool,
    },

    /// Session setup step; `done` marks completion
    Progress { message: String, done: bool },

    /// Status message (informational)
    Status(String),

    Error(String),

    Warning(String),

    /// Dimmed internal info
    System(String),

    NewLine,
}

// ============================================================================
// Output Writer Trait
// ============================================================================

/// Trait for writing output events
pub trait OutputWriter: Send + Sync {
    /// Write an output event
    fn write(&self, event: OutputEvent);

    /// Flush any buffered output
    fn flush(&self);

    /// Whether this writer supports colors/formatting
    fn supports_colors(&self) -> bool {
        false
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Pick the writer: plain when asked for or when stdout is not a terminal
pub fn select_output(force_plain: bool, verbose: bool) -> Box<dyn OutputWriter> {
    if force_plain || !std::io::stdout().is_terminal() {
        Box::new(PlainOutput::new().with_verbose(verbose))
    } else {
        Box::new(TerminalOutput::new().with_verbose(verbose))
    }
}

/// Render tool arguments on one line; empty for `{}` and null
pub(crate) fn format_arguments(args: &serde_json::Value) -> String {
    match args {
        serde_json::Value::Object(map) if map.is_empty() => String::new(),
        serde_json::Value::Null => String::new(),
        _ => preview(&serde_json::to_string(args).unwrap_or_default(), 80),
    }
}

/// Cut `text` to at most `max` characters, marking the cut with `...`
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock output writer for testing
    struct MockOutput {
        events: Arc<Mutex<Vec<OutputEvent>>>,
    }

    impl OutputWriter for MockOutput {
        fn write(&self, event: OutputEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_mock_output_through_trait_object() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let output: Box<dyn OutputWriter> = Box::new(MockOutput {
            events: events.clone(),
        });

        output.write(OutputEvent::Token("Hel".to_string()));
        output.write(OutputEvent::Token("lo".to_string()));
        output.write(OutputEvent::NewLine);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0], OutputEvent::Token("Hel".to_string()));
        assert!(!output.supports_colors());
    }

    #[test]
    fn test_format_arguments() {
        assert_eq!(format_arguments(&serde_json::json!({})), "");
        assert_eq!(format_arguments(&serde_json::Value::Null), "");

        let formatted = format_arguments(&serde_json::json!({"libraryName": "tokio"}));
        assert_eq!(formatted, r#"{"libraryName":"tokio"}"#);

        let long = serde_json::json!({"topic": "x".repeat(200)});
        assert_eq!(format_arguments(&long).chars().count(), 80);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("short", 10), "short");
        let text = "é".repeat(20);
        let cut = preview(&text, 10);
        assert_eq!(cut, format!("{}...", "é".repeat(7)));
    }

    #[test]
    fn test_forced_plain_output() {
        let output = select_output(true, false);
        assert!(!output.supports_colors());
    }
}
