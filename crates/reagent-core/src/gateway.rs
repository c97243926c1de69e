//! Model Gateway Strategy Pattern
//!
//! Defines the single interface the control loop uses to talk to an LLM
//! backend (Ollama, OpenAI, Anthropic, ...). The loop is written entirely
//! against this trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reagent_core::gateway::ModelGateway;
//!
//! let gateway = OllamaGateway::connect(config).await?;
//! let text = gateway.generate(system_instruction, transcript.messages()).await?;
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// Strategy trait for model backends.
///
/// Implementations must signal distinguishable failures for connection
/// errors, timeouts, and malformed upstream payloads (the
/// `Gateway*`/`MalformedPayload` variants of [`crate::AgentError`]).
/// The control loop does not interpret or retry these; they propagate
/// out of `Agent::run` unchanged. Resilience such as request timeouts or
/// connection checks is the implementation's concern.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Generate free-text model output for the given system instruction
    /// and ordered transcript.
    async fn generate(
        &self,
        system_instruction: &str,
        transcript: &[Message],
    ) -> Result<String>;
}
