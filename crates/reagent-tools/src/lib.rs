//! # reagent-tools
//!
//! Builtin tools for the reagent system. Each tool takes one string input
//! and produces one string output; failures surface as ordinary errors
//! the dispatcher converts to diagnostic observations.

pub mod calculator;
pub mod file;

pub use calculator::CalculatorTool;
pub use file::{ReadFileTool, WriteFileTool};

use reagent_core::ToolRegistry;

/// Build a registry with all builtin tools registered.
pub fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(CalculatorTool);
    registry.register(ReadFileTool);
    registry.register(WriteFileTool);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_names() {
        let registry = builtin_registry();
        assert_eq!(registry.names(), vec!["calculate", "read_file", "write_file"]);
    }
}
