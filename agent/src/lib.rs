//! Axiom: a terminal chat agent backed by MCP tool servers
//!
//! Configuration is resolved once into [`config::Settings`]. A
//! [`agent::ChatSession`] owns the history and the tool servers started for
//! it, and delegates each turn to an [`llm::AgentRuntime`].

pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod mcp;
pub mod output;
pub mod prompts;
