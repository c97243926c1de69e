//! # reagent-runtime
//!
//! Model gateway implementations for the reagent system.
//!
//! ## Gateways
//!
//! - **Ollama**: local LLM inference via the Ollama chat API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reagent_runtime::ollama::{OllamaConfig, OllamaGateway};
//!
//! let gateway = OllamaGateway::connect(OllamaConfig::from_env()).await?;
//! let agent = AgentBuilder::new()
//!     .gateway(Arc::new(gateway))
//!     .build()?;
//! ```

pub mod ollama;

pub use ollama::{OllamaConfig, OllamaGateway};

// Re-export core types for convenience
pub use reagent_core::{Agent, AgentBuilder, AgentError, Message, ModelGateway, Result, Role};
