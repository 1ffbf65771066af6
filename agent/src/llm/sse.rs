//! Streamed chat completion chunks
//!
//! Event framing is done by `eventsource-stream`; this module decodes the
//! `data:` payloads and accumulates tool calls that arrive as fragments.

use serde::Deserialize;

// ============================================================================
// Chunk types (OpenAI chat.completion.chunk)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDelta>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
pub struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

// ============================================================================
// Tool call accumulation
// ============================================================================

/// A tool call assembled from stream fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON argument text
    pub arguments: String,
}

/// Accumulates one streamed completion
#[derive(Debug, Default)]
pub struct CompletionBuffer {
    content: String,
    tool_calls: Vec<PendingToolCall>,
    finish_reason: Option<String>,
}

impl CompletionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one chunk; returns the text it added, if any
    pub fn apply(&mut self, chunk: ChatCompletionChunk) -> Option<String> {
        let mut text = String::new();

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                text.push_str(&content);
            }
            for delta in choice.delta.tool_calls {
                self.merge_tool_call(delta);
            }
            if choice.finish_reason.is_some() {
                self.finish_reason = choice.finish_reason;
            }
        }

        if text.is_empty() {
            return None;
        }
        self.content.push_str(&text);
        Some(text)
    }

    fn merge_tool_call(&mut self, delta: ToolCallDelta) {
        // Some providers omit the index and send each call whole; a new id
        // then starts a new slot.
        let index = match (delta.index, &delta.id) {
            (Some(index), _) => index,
            (None, Some(id)) => match self.tool_calls.iter().position(|c| &c.id == id) {
                Some(existing) => existing,
                None => self.tool_calls.len(),
            },
            (None, None) => self.tool_calls.len().saturating_sub(1),
        };

        while self.tool_calls.len() <= index {
            self.tool_calls.push(PendingToolCall::default());
        }

        let call = &mut self.tool_calls[index];
        if let Some(id) = delta.id {
            if !id.is_empty() {
                call.id = id;
            }
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                call.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                call.arguments.push_str(&arguments);
            }
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// Completed tool calls; calls without a name are dropped and missing ids filled in
    pub fn into_tool_calls(self) -> Vec<PendingToolCall> {
        self.tool_calls
            .into_iter()
            .filter(|c| !c.name.is_empty())
            .enumerate()
            .map(|(i, mut c)| {
                if c.id.is_empty() {
                    c.id = format!("call_{}", i);
                }
                c
            })
            .collect()
    }
}
