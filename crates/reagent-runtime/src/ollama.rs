//! Ollama Model Gateway
//!
//! Implementation of `ModelGateway` against the Ollama chat API. Talks to
//! the HTTP endpoint directly so the gateway controls its own request
//! timeout; responses are requested unstreamed and returned as one text.

use std::time::Duration;

use async_trait::async_trait;
use reagent_core::{
    error::{AgentError, Result},
    gateway::ModelGateway,
    message::{Message, Role},
};
use serde::{Deserialize, Serialize};

/// Ollama gateway configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model identifier (must be pulled in Ollama first)
    pub model: String,

    /// Sampling temperature. Kept low so tool-use behavior stays
    /// reproducible.
    pub temperature: f32,

    /// Fixed request timeout in seconds
    pub timeout_secs: u64,

    /// Connection-check attempts at construction
    pub connect_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2:3b".into(),
            temperature: 0.1,
            timeout_secs: 60,
            connect_retries: 3,
        }
    }
}

impl OllamaConfig {
    /// Read host, port, and model from `OLLAMA_HOST` / `OLLAMA_PORT` /
    /// `OLLAMA_MODEL`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("OLLAMA_HOST").unwrap_or(defaults.host);
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let model = std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model);

        Self {
            host,
            port,
            model,
            ..defaults
        }
    }

    fn base_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Ollama-backed model gateway
pub struct OllamaGateway {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaGateway {
    /// Connect to Ollama, verifying the server is reachable.
    ///
    /// The connection check (`GET /api/tags`) retries with linear backoff
    /// up to `connect_retries` attempts before giving up with
    /// [`AgentError::GatewayUnavailable`].
    pub async fn connect(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Gateway(e.to_string()))?;

        let gateway = Self { client, config };
        gateway.check_connection().await?;
        Ok(gateway)
    }

    /// Connect using environment-derived configuration
    pub async fn connect_from_env() -> Result<Self> {
        Self::connect(OllamaConfig::from_env()).await
    }

    /// The configuration this gateway was built with
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn check_connection(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.config.base_url());
        let mut last_error = String::new();

        for attempt in 1..=self.config.connect_retries {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(url = %self.config.base_url(), "connected to Ollama");
                    return Ok(());
                }
                Ok(response) => {
                    last_error = format!("HTTP {}", response.status());
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt < self.config.connect_retries {
                let backoff = Duration::from_millis(500 * u64::from(attempt));
                tracing::warn!(attempt, error = %last_error, "Ollama not reachable, retrying");
                tokio::time::sleep(backoff).await;
            }
        }

        Err(AgentError::GatewayUnavailable(format!(
            "Ollama connection failed at {}: {}",
            self.config.base_url(),
            last_error
        )))
    }
}

/// Render the system instruction plus transcript as Ollama chat messages
fn wire_messages<'a>(system_instruction: &'a str, transcript: &'a [Message]) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(WireMessage {
        role: "system",
        content: system_instruction,
    });
    messages.extend(transcript.iter().map(|m| WireMessage {
        role: match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: &m.content,
    }));
    messages
}

#[async_trait]
impl ModelGateway for OllamaGateway {
    async fn generate(
        &self,
        system_instruction: &str,
        transcript: &[Message],
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: wire_messages(system_instruction, transcript),
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        let url = format!("{}/api/chat", self.config.base_url());
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::GatewayTimeout(format!(
                        "no response within {} seconds",
                        self.config.timeout_secs
                    ))
                } else if e.is_connect() {
                    AgentError::GatewayUnavailable(e.to_string())
                } else {
                    AgentError::Gateway(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Gateway(format!(
                "chat request failed: HTTP {status}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedPayload(e.to_string()))?;

        Ok(body.message.content)
    }
}
