//! Control Loop
//!
//! Implements the ReAct (Reason + Act) pattern: the model alternates
//! between proposing a tool call and consuming its observed result until
//! it produces a final answer or the iteration budget runs out.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::gateway::ModelGateway;
use crate::message::{Message, Transcript};
use crate::parser::{parse, ParsedIntent};
use crate::tool::{Dispatcher, Tool, ToolRegistry};

/// Instruction preamble sent to the model on every call. The `{tools}`
/// marker is replaced with the rendered tool catalogue at construction.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI agent that can use tools to accomplish tasks.

When you need to use a tool, respond with JSON in this exact format:
{ "thought": "your reasoning about what to do",
  "action": "tool_name",
  "action_input": "input for the tool" }

When you have the final answer, respond with JSON in this format:
{ "thought": "summary of what you found",
  "final_answer": "your complete answer to the user" }

Available tools:
{tools}

Important rules:
- Always respond with valid JSON only
- Use tools when you need to perform actions or get information
- Think step by step
- When you have all the information needed, provide the final_answer"#;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template; a `{tools}` marker is replaced with the
    /// rendered catalogue
    pub system_prompt: String,

    /// Maximum gateway calls per `run` before giving up. Must be >= 1;
    /// validated at construction.
    pub max_iterations: usize,

    /// Optional per-call timeout for tool execution
    pub tool_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            tool_timeout: None,
        }
    }
}

/// The ReAct control loop.
///
/// Owns a fixed system instruction (tool catalogue rendered once at
/// construction from an immutable registry snapshot) and drives the
/// iterate-parse-dispatch-observe cycle. One `run` call owns its
/// transcript exclusively; concurrent `run` calls against the same agent
/// are safe as long as the registered tools tolerate concurrent
/// invocation.
pub struct Agent {
    gateway: Arc<dyn ModelGateway>,
    dispatcher: Dispatcher,
    config: AgentConfig,
    system_instruction: String,
}

impl Agent {
    /// Create a new agent.
    ///
    /// Fails with [`AgentError::Config`] when `max_iterations` is zero.
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Result<Self> {
        if config.max_iterations == 0 {
            return Err(AgentError::Config(
                "max_iterations must be at least 1".into(),
            ));
        }

        let system_instruction = config
            .system_prompt
            .replace("{tools}", &tools.render_catalogue());
        let dispatcher = Dispatcher::new(tools).with_timeout(config.tool_timeout);

        Ok(Self {
            gateway,
            dispatcher,
            config,
            system_instruction,
        })
    }

    /// Run the agent on a query, returning the final answer or the
    /// budget-exhausted message.
    ///
    /// Per iteration: ask the gateway, parse the response, then either
    /// terminate with a final answer, dispatch the requested tool and
    /// fold the observation back into the transcript, or issue a
    /// corrective instruction when the response carries no usable intent.
    /// Every non-terminating iteration appends exactly two transcript
    /// entries (the raw assistant turn and the next user turn).
    ///
    /// Gateway transport failures propagate immediately; the loop does
    /// not retry them. Budget exhaustion is not an error: after
    /// `max_iterations` gateway calls without a final answer the loop
    /// returns a deterministic sentinel message.
    pub async fn run(&self, query: &str) -> Result<String> {
        let mut transcript = Transcript::new();
        transcript.push(Message::user(query));

        for iteration in 1..=self.config.max_iterations {
            tracing::debug!(
                iteration,
                max_iterations = self.config.max_iterations,
                "agent iteration"
            );

            let raw = self
                .gateway
                .generate(&self.system_instruction, transcript.messages())
                .await?;

            match parse(&raw) {
                Ok(ParsedIntent::FinalAnswer {
                    thought,
                    final_answer,
                }) => {
                    tracing::info!(%thought, "final answer reached");
                    return Ok(final_answer);
                }
                Ok(ParsedIntent::ToolCall {
                    thought,
                    action,
                    action_input,
                }) => {
                    tracing::info!(%thought, %action, %action_input, "tool call");
                    let observation = self.dispatcher.dispatch(&action, &action_input).await;
                    tracing::info!(%observation, "observation");

                    transcript.push(Message::assistant(raw));
                    transcript.push(Message::user(format!("Observation: {observation}")));
                }
                Err(failure) => {
                    tracing::info!(%failure, "no usable intent, issuing corrective instruction");
                    transcript.push(Message::assistant(raw));
                    transcript.push(Message::user(failure.corrective_instruction()));
                }
            }
        }

        Ok(format!(
            "Agent stopped after {} iterations without finding an answer.",
            self.config.max_iterations
        ))
    }

    /// The fixed system instruction sent on every gateway call
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// The registry this agent dispatches against
    pub fn tools(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    gateway: Option<Arc<dyn ModelGateway>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            gateway: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let gateway = self
            .gateway
            .ok_or_else(|| AgentError::Config("Gateway is required".into()))?;

        Agent::new(gateway, Arc::new(self.tools), self.config)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::message::Role;

    /// Gateway that replays a fixed script and records what it was sent.
    struct ScriptedGateway {
        script: Vec<String>,
        calls: AtomicUsize,
        seen_transcripts: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedGateway {
        fn new(script: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                script: script.iter().map(ToString::to_string).collect(),
                calls: AtomicUsize::new(0),
                seen_transcripts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn transcript_seen_at(&self, call: usize) -> Vec<Message> {
            self.seen_transcripts.lock().unwrap()[call].clone()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn generate(
            &self,
            _system_instruction: &str,
            transcript: &[Message],
        ) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_transcripts
                .lock()
                .unwrap()
                .push(transcript.to_vec());
            // Repeat the last scripted line once the script runs out.
            let index = call.min(self.script.len() - 1);
            Ok(self.script[index].clone())
        }
    }

    /// Gateway that always fails with a transport error.
    struct DeadGateway;

    #[async_trait]
    impl ModelGateway for DeadGateway {
        async fn generate(&self, _system: &str, _transcript: &[Message]) -> Result<String> {
            Err(AgentError::GatewayTimeout("no response in 60s".into()))
        }
    }

    /// Tool that counts invocations and multiplies 6*7.
    struct CountingCalc {
        invocations: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingCalc {
        fn name(&self) -> &str {
            "calculate"
        }

        fn description(&self) -> &str {
            "Perform mathematical calculations. Input: expression"
        }

        async fn invoke(&self, _input: &str) -> Result<String> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok("Result: 42".into())
        }
    }

    fn agent_with(gateway: Arc<dyn ModelGateway>, max_iterations: usize) -> (Agent, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let agent = AgentBuilder::new()
            .gateway(gateway)
            .tool(CountingCalc {
                invocations: invocations.clone(),
            })
            .max_iterations(max_iterations)
            .build()
            .unwrap();
        (agent, invocations)
    }

    #[tokio::test]
    async fn test_two_step_scenario() {
        let gateway = ScriptedGateway::new(&[
            r#"{"thought":"multiply","action":"calculate","action_input":"6*7"}"#,
            r#"{"thought":"done","final_answer":"42"}"#,
        ]);
        let (agent, invocations) = agent_with(gateway.clone(), 5);

        let answer = agent.run("What is 6 times 7?").await.unwrap();

        assert_eq!(answer, "42");
        assert_eq!(gateway.calls(), 2);
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        // Second call sees query + assistant turn + observation turn.
        let transcript = gateway.transcript_seen_at(1);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[2].content, "Observation: Result: 42");
    }

    #[tokio::test]
    async fn test_termination_after_exactly_max_iterations() {
        let gateway = ScriptedGateway::new(&["I refuse to emit JSON."]);
        let (agent, _) = agent_with(gateway.clone(), 3);

        let answer = agent.run("anything").await.unwrap();

        assert_eq!(
            answer,
            "Agent stopped after 3 iterations without finding an answer."
        );
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_final_answer_priority_skips_dispatch() {
        let gateway = ScriptedGateway::new(&[
            r#"{"thought":"t","final_answer":"done","action":"calculate","action_input":"1+1"}"#,
        ]);
        let (agent, invocations) = agent_with(gateway.clone(), 5);

        let answer = agent.run("q").await.unwrap();

        assert_eq!(answer, "done");
        assert_eq!(gateway.calls(), 1);
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_recovery_appends_two_entries() {
        let gateway = ScriptedGateway::new(&[
            "not json at all",
            r#"{"final_answer":"recovered"}"#,
        ]);
        let (agent, _) = agent_with(gateway.clone(), 5);

        let answer = agent.run("q").await.unwrap();

        assert_eq!(answer, "recovered");
        assert_eq!(gateway.calls(), 2);

        let first = gateway.transcript_seen_at(0);
        assert_eq!(first.len(), 1);

        let second = gateway.transcript_seen_at(1);
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].content, "not json at all");
        assert_eq!(second[2].content, "Please respond with valid JSON only.");
    }

    #[tokio::test]
    async fn test_missing_keys_gets_field_corrective_instruction() {
        let gateway = ScriptedGateway::new(&[
            r#"{"thought":"I am stuck"}"#,
            r#"{"final_answer":"ok"}"#,
        ]);
        let (agent, _) = agent_with(gateway.clone(), 5);

        agent.run("q").await.unwrap();

        let second = gateway.transcript_seen_at(1);
        assert_eq!(
            second[2].content,
            "Please provide either 'final_answer' or both 'action' and 'action_input'."
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_feeds_diagnostic_observation() {
        let gateway = ScriptedGateway::new(&[
            r#"{"thought":"t","action":"launch_rocket","action_input":"now"}"#,
            r#"{"final_answer":"ok"}"#,
        ]);
        let (agent, _) = agent_with(gateway.clone(), 5);

        let answer = agent.run("q").await.unwrap();

        assert_eq!(answer, "ok");
        let second = gateway.transcript_seen_at(1);
        assert!(second[2].content.starts_with("Observation: "));
        assert!(second[2].content.contains("'launch_rocket' not found"));
        assert!(second[2].content.contains("calculate"));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (agent, _) = agent_with(Arc::new(DeadGateway), 5);

        let err = agent.run("q").await.unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(err, AgentError::GatewayTimeout(_)));
    }

    #[tokio::test]
    async fn test_builder_rejects_zero_iterations() {
        let gateway = ScriptedGateway::new(&["x"]);
        let result = AgentBuilder::new()
            .gateway(gateway)
            .max_iterations(0)
            .build();
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[tokio::test]
    async fn test_builder_requires_gateway() {
        let result = AgentBuilder::new().max_iterations(3).build();
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[tokio::test]
    async fn test_system_instruction_contains_catalogue() {
        let gateway = ScriptedGateway::new(&["x"]);
        let (agent, _) = agent_with(gateway, 1);
        assert!(agent
            .system_instruction()
            .contains("- calculate: Perform mathematical calculations. Input: expression"));
        assert!(!agent.system_instruction().contains("{tools}"));
    }
}
