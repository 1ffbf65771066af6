//! OpenAI-compatible chat completions runtime
//!
//! Streams `/chat/completions` over SSE. Text deltas are yielded as they
//! arrive; tool calls requested by the model are executed on the owning
//! MCP server and the results fed back, up to [`MAX_ITERATIONS`] rounds.

use std::time::Instant;

use eventsource_stream::Eventsource;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use serde::Serialize;

use super::sse::{ChatCompletionChunk, CompletionBuffer, PendingToolCall};
use super::tools::{FunctionTool, ToolRouter};
use super::{AgentRuntime, Message, Role, RunEvent, RuntimeError};
use crate::agent::AgentSpec;
use crate::config::Settings;

/// Maximum number of tool-calling iterations to prevent infinite loops
pub const MAX_ITERATIONS: usize = 10;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [FunctionTool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, content: String) -> Self {
        Self {
            role: "tool",
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }

    fn assistant_calls(content: &str, calls: &[PendingToolCall]) -> Self {
        Self {
            role: "assistant",
            content: (!content.is_empty()).then(|| content.to_string()),
            tool_calls: Some(
                calls
                    .iter()
                    .map(|c| WireToolCall {
                        id: c.id.clone(),
                        call_type: "function",
                        function: WireFunctionCall {
                            name: c.name.clone(),
                            arguments: c.arguments.clone(),
                        },
                    })
                    .collect(),
            ),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// ============================================================================
// Runtime
// ============================================================================

/// Runtime backed by an OpenAI-compatible HTTP endpoint
pub struct OpenAiRuntime {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_tokens: Option<u32>,
    trace_runs: bool,
}

impl OpenAiRuntime {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            max_tokens: None,
            trace_runs: false,
        }
    }

    /// Build from settings; fails when no API key is configured
    pub fn from_settings(settings: &Settings) -> Result<Self, crate::config::SettingsError> {
        let api_key = settings.require_api_key()?;
        Ok(Self::new(&settings.base_url, api_key)
            .with_max_tokens(settings.max_response_tokens)
            .with_tracing(settings.tracing_enabled))
    }

    /// Cap completion tokens per request
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Log each request/response step at info instead of debug
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.trace_runs = enabled;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn trace(&self, message: std::fmt::Arguments<'_>) {
        if self.trace_runs {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }

    fn initial_messages(agent: &AgentSpec<'_>, history: &[Message]) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage::text("system", agent.instructions.clone()));
        messages.extend(
            history
                .iter()
                .map(|m| WireMessage::text(role_name(m.role), m.content.clone())),
        );
        messages
    }

    fn request_body<'r>(
        &self,
        model: &'r str,
        messages: &'r [WireMessage],
        tools: &'r [FunctionTool],
    ) -> ChatRequest<'r> {
        ChatRequest {
            model,
            messages,
            stream: true,
            tools: (!tools.is_empty()).then_some(tools),
            max_tokens: self.max_tokens,
        }
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<reqwest::Response, RuntimeError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::Api { status, body });
        }

        Ok(response)
    }
}

fn decode(data: &str) -> Result<ChatCompletionChunk, RuntimeError> {
    Ok(serde_json::from_str(data)?)
}

impl OpenAiRuntime {
    fn run<'a>(
        &'a self,
        agent: &'a AgentSpec<'a>,
        history: &'a [Message],
    ) -> impl Stream<Item = Result<RunEvent, RuntimeError>> + Send + 'a {
        async_stream::try_stream! {
            let router = ToolRouter::new(&agent.servers);
            let tools = router.definitions();
            let mut messages = Self::initial_messages(agent, history);
            let run_start = Instant::now();
            let mut finished = false;

            self.trace(format_args!(
                "Agent '{}' run: model={} messages={} tools={}",
                agent.name,
                agent.model,
                messages.len(),
                tools.len()
            ));

            for iteration in 1..=MAX_ITERATIONS {
                let body = self.request_body(&agent.model, &messages, &tools);
                let response = self.send(&body).await?;

                let mut completion = CompletionBuffer::new();
                let mut events = response.bytes_stream().eventsource();

                while let Some(event) = events.next().await {
                    let event = event.map_err(|e| RuntimeError::Stream(e.to_string()))?;
                    if event.data.is_empty() {
                        continue;
                    }
                    if event.data == "[DONE]" {
                        break;
                    }
                    if let Some(text) = completion.apply(decode(&event.data)?) {
                        yield RunEvent::TextDelta(text);
                    }
                }

                let content = completion.content().to_string();
                self.trace(format_args!(
                    "Iteration {}: {} chars, finish_reason={:?}",
                    iteration,
                    content.len(),
                    completion.finish_reason()
                ));

                let calls = completion.into_tool_calls();
                if calls.is_empty() {
                    finished = true;
                    break;
                }

                tracing::info!("Agent making {} tool call(s)", calls.len());
                messages.push(WireMessage::assistant_calls(&content, &calls));

                for call in &calls {
                    let arguments: serde_json::Value = if call.arguments.trim().is_empty() {
                        serde_json::json!({})
                    } else {
                        serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                            tracing::warn!("Unparseable arguments for {}: {}", call.name, e);
                            serde_json::json!({})
                        })
                    };

                    let server = router.server_for(&call.name);
                    yield RunEvent::ToolStarted {
                        server: server.map(|s| s.name().to_string()).unwrap_or_default(),
                        name: call.name.clone(),
                        arguments: arguments.clone(),
                    };

                    let tool_start = Instant::now();
                    let outcome = match server {
                        Some(server) => server
                            .call_tool(&call.name, Some(arguments))
                            .await
                            .map_err(|e| e.to_string()),
                        None => Err(format!("unknown tool '{}'", call.name)),
                    };
                    let (result, is_error) = match outcome {
                        Ok(output) => (output, false),
                        Err(e) => (format!("Error calling tool {}: {}", call.name, e), true),
                    };

                    yield RunEvent::ToolFinished {
                        name: call.name.clone(),
                        result: result.clone(),
                        duration: tool_start.elapsed(),
                        is_error,
                    };

                    messages.push(WireMessage::tool_result(&call.id, result));
                }
            }

            self.trace(format_args!(
                "Agent '{}' run finished in {}ms",
                agent.name,
                run_start.elapsed().as_millis()
            ));

            if !finished {
                Err::<(), _>(RuntimeError::MaxIterations(MAX_ITERATIONS))?;
            }
        }
    }
}

impl AgentRuntime for OpenAiRuntime {
    fn run_streamed<'a>(
        &'a self,
        agent: &'a AgentSpec<'a>,
        history: &'a [Message],
    ) -> BoxStream<'a, Result<RunEvent, RuntimeError>> {
        self.run(agent, history).boxed()
    }
}
