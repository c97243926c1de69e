//! Tool System
//!
//! String-in/string-out tools the model can invoke by name, plus the
//! dispatcher that guarantees every invocation resolves to an observation
//! string. Tools are registered once; the set is immutable for the
//! lifetime of an agent.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentError, Result};

/// A capability the model can invoke.
///
/// `name` is the unique lookup key; `description` must be renderable as a
/// single line (it is embedded verbatim into the system instruction).
/// `invoke` takes one string and produces one string; failures are
/// ordinary `Err` values, converted to diagnostic observations at the
/// dispatcher boundary. An implementation must never leave a resource in
/// an inconsistent state when it fails.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier
    fn name(&self) -> &str;

    /// One-line human-readable description, shown to the model
    fn description(&self) -> &str;

    /// Execute the tool with the given input
    async fn invoke(&self, input: &str) -> Result<String>;
}

/// Registry of available tools.
///
/// Backed by an ordered map so that enumeration (diagnostics, prompt
/// rendering) is deterministic: names always appear in sorted order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool, replacing any previous tool of the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the tool catalogue for the system instruction, one
    /// `- name: description` line per tool in sorted order.
    pub fn render_catalogue(&self) -> String {
        self.tools
            .values()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Executes tool calls against a registry snapshot.
///
/// The dispatcher is infallible: every call returns an observation
/// string, whatever the tool does. Unknown names, tool errors, and
/// (when configured) timeouts all become diagnostic observations fed
/// back to the model.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    tool_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher without a per-call timeout
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            tool_timeout: None,
        }
    }

    /// Set an optional per-call timeout for tool execution
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// The registry this dispatcher executes against
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute `name` with `input`, resolving to an observation string.
    ///
    /// Empty input is passed through verbatim; tools reject it themselves
    /// when it is invalid for them.
    pub async fn dispatch(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.registry.get(name) else {
            return format!(
                "Error: tool '{}' not found. Available tools: {}",
                name,
                self.registry.names().join(", ")
            );
        };

        let invocation = tool.invoke(input);
        let result = match self.tool_timeout {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(tool = name, ?limit, "tool call timed out");
                    return format!(
                        "Error: tool '{}' timed out after {} seconds",
                        name,
                        limit.as_secs()
                    );
                }
            },
            None => invocation.await,
        };

        match result {
            Ok(observation) => observation,
            Err(e) => {
                tracing::debug!(tool = name, error = %e, "tool call failed");
                let message = match e {
                    AgentError::ToolExecution(msg) => msg,
                    other => other.to_string(),
                };
                format!("Error executing tool: {message}")
            }
        }
    }
}
