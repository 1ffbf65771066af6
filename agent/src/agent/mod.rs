//! Agent assembly and chat sessions
//!
//! [`mode`] decides which tools, prompt and model a turn gets; [`session`]
//! runs turns against an [`crate::llm::AgentRuntime`] and owns the history
//! and tool servers.

pub mod mode;
pub mod session;

pub use mode::{assemble, AgentSpec, ChatMode};
pub use session::{ChatSession, EMPTY_RESPONSE_MESSAGE, ERROR_SENTINEL, GENERIC_ERROR_MESSAGE};
