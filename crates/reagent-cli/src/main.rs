//! reagent CLI
//!
//! Constructs one agent (Ollama gateway + builtin tools) and runs a set
//! of literal queries, printing the final answer for each. The
//! thought/action/observation trace is emitted through the tracing fmt
//! layer. No flags; configuration comes from the environment
//! (`OLLAMA_HOST`, `OLLAMA_PORT`, `OLLAMA_MODEL`, `AGENT_MAX_ITERATIONS`).

use std::sync::Arc;

use reagent_core::AgentBuilder;
use reagent_runtime::ollama::{OllamaConfig, OllamaGateway};
use reagent_tools::builtin_registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Example queries exercising each builtin tool
const QUERIES: &[&str] = &[
    "What is 25 multiplied by 47?",
    "Read the file example.txt and tell me what it contains",
    "Calculate the result of (15 + 23) * 2, then save it to result.txt",
];

fn max_iterations_from_env() -> usize {
    std::env::var("AGENT_MAX_ITERATIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = OllamaConfig::from_env();
    tracing::info!(model = %config.model, "starting reagent");

    // Connection failures here are fatal; the loop never retries transport.
    let gateway = Arc::new(OllamaGateway::connect(config).await?);

    let tools = builtin_registry();
    tracing::info!("registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {name}");
    }

    let agent = AgentBuilder::new()
        .gateway(gateway)
        .tools(tools)
        .max_iterations(max_iterations_from_env())
        .build()?;

    for query in QUERIES {
        println!("{}", "=".repeat(60));
        println!("Query: {query}");

        match agent.run(query).await {
            Ok(answer) => println!("✓ Final answer: {answer}"),
            Err(e) => println!("✗ Error: {e}"),
        }
    }

    println!("\nAgent session completed.");
    Ok(())
}
