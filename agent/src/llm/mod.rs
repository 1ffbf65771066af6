//! Agent runtime abstraction
//!
//! The session hands the whole conversation to an [`AgentRuntime`] and
//! consumes a stream of [`RunEvent`]s. Text deltas are the response; tool
//! events are informational.

mod openai;
mod sse;
mod tools;

pub use openai::OpenAiRuntime;

use std::time::Duration;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::AgentSpec;

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Something produced while the runtime works on a turn
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A fragment of the assistant's answer
    TextDelta(String),
    /// A tool call is about to run
    ToolStarted {
        server: String,
        name: String,
        arguments: serde_json::Value,
    },
    /// A tool call finished
    ToolFinished {
        name: String,
        result: String,
        duration: Duration,
        is_error: bool,
    },
}

/// Failures of a delegated agent run
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Transport failure talking to the model endpoint
    #[error("request to model endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("model endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The event stream broke off or was not valid SSE
    #[error("event stream failed: {0}")]
    Stream(String),

    /// A streamed chunk could not be decoded
    #[error("failed to decode streamed chunk: {0}")]
    Decode(#[from] serde_json::Error),

    /// The model kept calling tools past the iteration limit
    #[error("agent reached maximum iterations ({0}) without completing")]
    MaxIterations(usize),

    /// Anything else reported by a runtime implementation
    #[error("{0}")]
    Other(String),
}

/// Executes an agent over a conversation, streaming the answer
pub trait AgentRuntime: Send + Sync {
    fn run_streamed<'a>(
        &'a self,
        agent: &'a AgentSpec<'a>,
        history: &'a [Message],
    ) -> BoxStream<'a, Result<RunEvent, RuntimeError>>;
}
