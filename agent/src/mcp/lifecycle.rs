//! Session-scoped set of running tool servers
//!
//! Servers are started one after another. A server that fails to start is
//! recorded and left out; the rest are still attempted. Shutdown drains the
//! set and attempts every stop even when an earlier one fails.

use super::error::McpServerError;
use super::server::{ServerLauncher, ToolServer};
use super::types::{McpServerDescriptor, McpTool};

/// A descriptor that could not be started
#[derive(Debug)]
pub struct StartFailure {
    pub name: String,
    pub error: McpServerError,
}

/// Outcome of [`McpServerSet::shutdown`]
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Servers stopped cleanly, in stop order
    pub stopped: Vec<String>,
    /// Servers whose stop failed
    pub failed: Vec<(String, McpServerError)>,
}

impl ShutdownReport {
    /// Number of stop attempts made
    pub fn attempted(&self) -> usize {
        self.stopped.len() + self.failed.len()
    }
}

/// The running tool servers of one chat session
#[derive(Default)]
pub struct McpServerSet {
    active: Vec<Box<dyn ToolServer>>,
    failures: Vec<StartFailure>,
}

impl McpServerSet {
    /// A set with no servers (tools disabled)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start every descriptor sequentially; only successes join the active set
    pub async fn start_all(
        launcher: &dyn ServerLauncher,
        descriptors: &[McpServerDescriptor],
    ) -> Self {
        let mut set = Self::default();

        for descriptor in descriptors {
            match launcher.launch(descriptor).await {
                Ok(server) => {
                    tracing::info!("Started MCP server '{}'", descriptor.name);
                    set.active.push(server);
                }
                Err(error) => {
                    tracing::warn!("Failed to start MCP server '{}': {}", descriptor.name, error);
                    set.failures.push(StartFailure {
                        name: descriptor.name.clone(),
                        error,
                    });
                }
            }
        }

        set
    }

    /// Running servers, in start order
    pub fn active(&self) -> impl Iterator<Item = &dyn ToolServer> {
        self.active.iter().map(|s| &**s as &dyn ToolServer)
    }

    /// Names of the running servers
    pub fn names(&self) -> Vec<String> {
        self.active().map(|s| s.name().to_string()).collect()
    }

    /// Descriptors that failed to start
    pub fn failures(&self) -> &[StartFailure] {
        &self.failures
    }

    /// All tools of all running servers
    pub fn tools(&self) -> Vec<McpTool> {
        self.active().flat_map(|s| s.tools().iter().cloned()).collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Stop every running server once. Later calls find an empty set.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        let mut report = ShutdownReport::default();

        for mut server in std::mem::take(&mut self.active) {
            let name = server.name().to_string();
            match server.stop().await {
                Ok(()) => {
                    tracing::info!("Stopped MCP server '{}'", name);
                    report.stopped.push(name);
                }
                Err(error) => {
                    tracing::warn!("Error stopping MCP server '{}': {}", name, error);
                    report.failed.push((name, error));
                }
            }
        }

        report
    }
}

impl Drop for McpServerSet {
    fn drop(&mut self) {
        if !self.active.is_empty() {
            tracing::warn!(
                "{} MCP server(s) dropped without shutdown; child processes are killed on drop",
                self.active.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    type StopLog = Arc<Mutex<Vec<String>>>;

    struct FakeServer {
        name: String,
        fail_stop: bool,
        stops: StopLog,
    }

    #[async_trait]
    impl ToolServer for FakeServer {
        fn name(&self) -> &str {
            &self.name
        }

        fn tools(&self) -> &[McpTool] {
            &[]
        }

        async fn call_tool(&self, tool: &str, _arguments: Option<Value>) -> Result<String, McpServerError> {
            Ok(format!("{}:{}", self.name, tool))
        }

        async fn stop(&mut self) -> Result<(), McpServerError> {
            self.stops.lock().unwrap().push(self.name.clone());
            if self.fail_stop {
                return Err(McpServerError::Stop {
                    name: self.name.clone(),
                    reason: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeLauncher {
        fail_start: HashSet<String>,
        fail_stop: HashSet<String>,
        launched: Mutex<Vec<String>>,
        stops: StopLog,
    }

    #[async_trait]
    impl ServerLauncher for FakeLauncher {
        async fn launch(
            &self,
            descriptor: &McpServerDescriptor,
        ) -> Result<Box<dyn ToolServer>, McpServerError> {
            self.launched.lock().unwrap().push(descriptor.name.clone());
            if self.fail_start.contains(&descriptor.name) {
                return Err(McpServerError::Initialize {
                    name: descriptor.name.clone(),
                    reason: "refused".to_string(),
                });
            }
            Ok(Box::new(FakeServer {
                name: descriptor.name.clone(),
                fail_stop: self.fail_stop.contains(&descriptor.name),
                stops: self.stops.clone(),
            }))
        }
    }

    fn descriptors(names: &[&str]) -> Vec<McpServerDescriptor> {
        names
            .iter()
            .map(|n| McpServerDescriptor::new(*n, "npx", &["-y"]))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_start_is_excluded() {
        let launcher = FakeLauncher {
            fail_start: HashSet::from(["a".to_string()]),
            ..Default::default()
        };

        let mut set = McpServerSet::start_all(&launcher, &descriptors(&["a", "b"])).await;

        assert_eq!(set.names(), vec!["b"]);
        assert_eq!(set.failures().len(), 1);
        assert_eq!(set.failures()[0].name, "a");
        // Both were attempted, in order
        assert_eq!(*launcher.launched.lock().unwrap(), vec!["a", "b"]);

        let report = set.shutdown().await;
        assert_eq!(report.stopped, vec!["b"]);
        assert_eq!(*launcher.stops.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_shutdown_continues_past_stop_failure() {
        let launcher = FakeLauncher {
            fail_stop: HashSet::from(["one".to_string()]),
            ..Default::default()
        };

        let mut set = McpServerSet::start_all(&launcher, &descriptors(&["one", "two", "three"])).await;
        assert_eq!(set.len(), 3);

        let report = set.shutdown().await;

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.stopped, vec!["two", "three"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "one");
        assert_eq!(*launcher.stops.lock().unwrap(), vec!["one", "two", "three"]);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_second_shutdown_stops_nothing() {
        let launcher = FakeLauncher::default();
        let mut set = McpServerSet::start_all(&launcher, &descriptors(&["x", "y"])).await;

        assert_eq!(set.shutdown().await.attempted(), 2);
        assert_eq!(set.shutdown().await.attempted(), 0);
        assert_eq!(launcher.stops.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_all_failing_leaves_empty_set() {
        let launcher = FakeLauncher {
            fail_start: HashSet::from(["a".to_string(), "b".to_string()]),
            ..Default::default()
        };

        let set = McpServerSet::start_all(&launcher, &descriptors(&["a", "b"])).await;
        assert!(set.is_empty());
        assert_eq!(set.failures().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_set() {
        let mut set = McpServerSet::empty();
        assert!(set.is_empty());
        assert!(set.tools().is_empty());
        assert_eq!(set.shutdown().await.attempted(), 0);
    }
}
