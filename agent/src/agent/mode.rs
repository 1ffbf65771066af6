//! Chat modes and per-mode agent assembly
//!
//! A mode picks three things for a turn: which running tool servers the
//! agent may use, which system prompt it gets, and which model runs it.

use std::fmt;

use crate::config::Settings;
use crate::mcp::ToolServer;
use crate::prompts::{self, ASK_PROMPT, BUILD_PROMPT};

/// Chat mode selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatMode {
    /// Plan and build complete projects with every tool server
    Build,
    /// Answer questions using only the documentation server
    #[default]
    Ask,
}

impl ChatMode {
    /// Parse a mode label. Unknown labels fall back to [`ChatMode::Ask`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "build" | "agent" => ChatMode::Build,
            "ask" | "chat" => ChatMode::Ask,
            other => {
                tracing::warn!("Unknown chat mode '{}', using ask", other);
                ChatMode::Ask
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChatMode::Build => "build",
            ChatMode::Ask => "ask",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            ChatMode::Build => BUILD_PROMPT,
            ChatMode::Ask => ASK_PROMPT,
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a runtime needs to run one turn
pub struct AgentSpec<'a> {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub servers: Vec<&'a dyn ToolServer>,
}

impl AgentSpec<'_> {
    pub fn server_names(&self) -> Vec<&str> {
        self.servers.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Debug for AgentSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSpec")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("servers", &self.server_names())
            .finish()
    }
}

/// Configure the agent for `mode` over the currently running servers
pub fn assemble<'a, I>(mode: ChatMode, settings: &Settings, active: I) -> AgentSpec<'a>
where
    I: IntoIterator<Item = &'a dyn ToolServer>,
{
    let servers: Vec<&'a dyn ToolServer> = match mode {
        ChatMode::Build => active.into_iter().collect(),
        ChatMode::Ask => active
            .into_iter()
            .filter(|s| s.name().eq_ignore_ascii_case(&settings.docs_server))
            .collect(),
    };

    let model = match mode {
        ChatMode::Build => settings.default_model.clone(),
        ChatMode::Ask => settings.ask_model.clone(),
    };

    let spec = AgentSpec {
        name: settings.agent_name.clone(),
        instructions: prompts::render(mode.template(), &settings.agent_name, settings.max_docs_tokens),
        model,
        servers,
    };

    tracing::debug!("Assembled {} agent: {:?}", mode, spec);
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::{McpServerError, McpTool};
    use async_trait::async_trait;
    use serde_json::Value;

    struct NamedServer(&'static str);

    #[async_trait]
    impl ToolServer for NamedServer {
        fn name(&self) -> &str {
            self.0
        }

        fn tools(&self) -> &[McpTool] {
            &[]
        }

        async fn call_tool(&self, _tool: &str, _arguments: Option<Value>) -> Result<String, McpServerError> {
            Ok(String::new())
        }

        async fn stop(&mut self) -> Result<(), McpServerError> {
            Ok(())
        }
    }

    fn settings() -> Settings {
        Settings {
            agent_name: "Axiom".to_string(),
            default_model: "build-model".to_string(),
            ask_model: "ask-model".to_string(),
            docs_server: "context7".to_string(),
            max_docs_tokens: 12_345,
            ..Settings::default()
        }
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(ChatMode::from_label("build"), ChatMode::Build);
        assert_eq!(ChatMode::from_label("Agent"), ChatMode::Build);
        assert_eq!(ChatMode::from_label(" ASK "), ChatMode::Ask);
        assert_eq!(ChatMode::from_label("chat"), ChatMode::Ask);
        assert_eq!(ChatMode::from_label("deploy"), ChatMode::Ask);
        assert_eq!(ChatMode::default(), ChatMode::Ask);
        assert_eq!(ChatMode::Build.to_string(), "build");
    }

    #[test]
    fn test_ask_keeps_only_docs_server() {
        let docs = NamedServer("Context7");
        let thinking = NamedServer("sequential-thinking");
        let active: Vec<&dyn ToolServer> = vec![&docs, &thinking];

        let spec = assemble(ChatMode::Ask, &settings(), active);

        assert_eq!(spec.server_names(), vec!["Context7"]);
        assert_eq!(spec.model, "ask-model");
        assert!(spec.instructions.contains("You are Axiom"));
        assert!(spec.instructions.contains("12345 tokens"));
    }

    #[test]
    fn test_build_keeps_everything() {
        let docs = NamedServer("context7");
        let thinking = NamedServer("sequential-thinking");
        let active: Vec<&dyn ToolServer> = vec![&docs, &thinking];

        let spec = assemble(ChatMode::Build, &settings(), active);

        assert_eq!(spec.server_names(), vec!["context7", "sequential-thinking"]);
        assert_eq!(spec.model, "build-model");
        assert!(spec.instructions.contains("Plan first"));
        assert!(spec.instructions.contains("up to 12345 tokens"));
    }

    #[test]
    fn test_ask_without_docs_server_has_no_tools() {
        let thinking = NamedServer("sequential-thinking");
        let active: Vec<&dyn ToolServer> = vec![&thinking];

        let spec = assemble(ChatMode::Ask, &settings(), active);
        assert!(spec.servers.is_empty());
    }
}
