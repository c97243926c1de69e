//! # reagent-core
//!
//! Core ReAct (Reason + Act) control loop with a gateway-agnostic LLM
//! abstraction and a string-in/string-out tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Agent                                │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │   Control   │  │  Dispatcher  │  │   ModelGateway      │  │
//! │  │    Loop     │──│  + Registry  │  │   (Strategy)        │  │
//! │  └──────┬──────┘  └──────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  ┌──────┴──────┐                                             │
//! │  │   Parser    │                                             │
//! │  └─────────────┘                                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ModelGateway` trait enables swapping between Ollama, OpenAI,
//! Anthropic, or any other backend without changing the loop.

pub mod agent;
pub mod error;
pub mod gateway;
pub mod message;
pub mod parser;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentConfig};
pub use error::{AgentError, Result};
pub use gateway::ModelGateway;
pub use message::{Message, Role, Transcript};
pub use parser::{parse, ParsedIntent, ParseFailure};
pub use tool::{Dispatcher, Tool, ToolRegistry};
