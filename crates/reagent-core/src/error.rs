//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Gateway request failed (HTTP error status, protocol error)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gateway unreachable or not responding
    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Gateway request exceeded its fixed timeout
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Gateway returned a payload that could not be decoded
    #[error("Malformed gateway payload: {0}")]
    MalformedPayload(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration error (builder contract violations)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if the error is a model-gateway transport failure.
    ///
    /// The control loop never interprets these; callers may want to,
    /// e.g. to distinguish a dead backend from a configuration mistake.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AgentError::Gateway(_)
                | AgentError::GatewayUnavailable(_)
                | AgentError::GatewayTimeout(_)
                | AgentError::MalformedPayload(_)
        )
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
