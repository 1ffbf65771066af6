//! In-process stand-ins for tool servers, the launcher, the runtime and output

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::Poll;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use tokio::sync::Notify;

use axiom::agent::AgentSpec;
use axiom::llm::{AgentRuntime, Message, RunEvent, RuntimeError};
use axiom::mcp::{McpServerDescriptor, McpServerError, McpTool, ServerLauncher, ToolServer};
use axiom::output::{OutputEvent, OutputWriter};

pub type Log = Arc<Mutex<Vec<String>>>;

pub struct FakeServer {
    name: String,
    tools: Vec<McpTool>,
    fail_stop: bool,
    stops: Log,
}

impl FakeServer {
    pub fn new(name: &str, stops: Log) -> Self {
        Self {
            name: name.to_string(),
            tools: vec![McpTool {
                server: name.to_string(),
                name: format!("{}-tool", name),
                description: None,
                input_schema: None,
            }],
            fail_stop: false,
            stops,
        }
    }
}

#[async_trait]
impl ToolServer for FakeServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    async fn call_tool(&self, tool: &str, _arguments: Option<Value>) -> Result<String, McpServerError> {
        Ok(format!("{} ran {}", self.name, tool))
    }

    async fn stop(&mut self) -> Result<(), McpServerError> {
        self.stops.lock().unwrap().push(self.name.clone());
        if self.fail_stop {
            return Err(McpServerError::Stop {
                name: self.name.clone(),
                reason: "still busy".to_string(),
            });
        }
        Ok(())
    }
}

/// Starts [`FakeServer`]s, failing the names it is told to
#[derive(Default)]
pub struct FakeLauncher {
    pub fail_start: HashSet<String>,
    pub fail_stop: HashSet<String>,
    pub stops: Log,
}

impl FakeLauncher {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            fail_start: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stops.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServerLauncher for FakeLauncher {
    async fn launch(&self, descriptor: &McpServerDescriptor) -> Result<Box<dyn ToolServer>, McpServerError> {
        if self.fail_start.contains(&descriptor.name) {
            return Err(McpServerError::Initialize {
                name: descriptor.name.clone(),
                reason: "handshake refused".to_string(),
            });
        }
        let mut server = FakeServer::new(&descriptor.name, self.stops.clone());
        server.fail_stop = self.fail_stop.contains(&descriptor.name);
        Ok(Box::new(server))
    }
}

/// One step of a scripted run
#[derive(Clone)]
pub enum Step {
    Text(&'static str),
    Tool(&'static str),
    Fail(&'static str),
    /// Fire the stall signal, then never finish
    Stall,
}

/// What the runtime saw for one turn
#[derive(Debug, Clone)]
pub struct SeenRun {
    pub model: String,
    pub servers: Vec<String>,
    pub history: Vec<Message>,
}

/// Replays one script per turn and records what it was given
#[derive(Default)]
pub struct ScriptedRuntime {
    scripts: Mutex<VecDeque<Vec<Step>>>,
    pub seen: Mutex<Vec<SeenRun>>,
    stall_signal: Option<Arc<Notify>>,
}

impl ScriptedRuntime {
    pub fn new(scripts: Vec<Vec<Step>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            seen: Mutex::new(Vec::new()),
            stall_signal: None,
        }
    }

    /// Notify `signal` when a [`Step::Stall`] is reached
    pub fn with_stall_signal(mut self, signal: Arc<Notify>) -> Self {
        self.stall_signal = Some(signal);
        self
    }

    pub fn runs(&self) -> Vec<SeenRun> {
        self.seen.lock().unwrap().clone()
    }
}

impl AgentRuntime for ScriptedRuntime {
    fn run_streamed<'a>(
        &'a self,
        agent: &'a AgentSpec<'a>,
        history: &'a [Message],
    ) -> BoxStream<'a, Result<RunEvent, RuntimeError>> {
        self.seen.lock().unwrap().push(SeenRun {
            model: agent.model.clone(),
            servers: agent.server_names().iter().map(|s| s.to_string()).collect(),
            history: history.to_vec(),
        });

        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        let stalls = script.iter().any(|step| matches!(step, Step::Stall));
        let events: Vec<Result<RunEvent, RuntimeError>> = script
            .into_iter()
            .flat_map(|step| match step {
                Step::Text(text) => vec![Ok(RunEvent::TextDelta(text.to_string()))],
                Step::Tool(name) => vec![
                    Ok(RunEvent::ToolStarted {
                        server: "context7".to_string(),
                        name: name.to_string(),
                        arguments: serde_json::json!({}),
                    }),
                    Ok(RunEvent::ToolFinished {
                        name: name.to_string(),
                        result: "ok".to_string(),
                        duration: Duration::from_millis(5),
                        is_error: false,
                    }),
                ],
                Step::Fail(reason) => vec![Err(RuntimeError::Other(reason.to_string()))],
                Step::Stall => vec![],
            })
            .collect();

        if !stalls {
            return stream::iter(events).boxed();
        }
        let mut signal = self.stall_signal.clone();
        stream::iter(events)
            .chain(stream::poll_fn(move |_| {
                if let Some(signal) = signal.take() {
                    signal.notify_one();
                }
                Poll::Pending
            }))
            .boxed()
    }
}

/// Output writer that keeps every event
#[derive(Default)]
pub struct RecordingOutput {
    events: Mutex<Vec<OutputEvent>>,
}

impl RecordingOutput {
    pub fn events(&self) -> Vec<OutputEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                OutputEvent::Token(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                OutputEvent::Warning(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &OutputEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }
}

impl OutputWriter for RecordingOutput {
    fn write(&self, event: OutputEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn flush(&self) {}
}
