//! File Tools
//!
//! Read and write text files in the working directory. Paths are reduced
//! to their final component so the model cannot reach outside it.

use std::path::Path;

use async_trait::async_trait;
use reagent_core::{
    error::{AgentError, Result},
    tool::Tool,
};

/// Strip directory components, keeping only the file name
fn sanitize(path: &str) -> std::result::Result<String, String> {
    Path::new(path.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Invalid file path '{path}'"))
}

/// Tool reading the contents of a text file
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read contents of a text file. Input: filepath"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let name = sanitize(input).map_err(AgentError::ToolExecution)?;

        match tokio::fs::read_to_string(&name).await {
            Ok(content) => Ok(format!("File '{name}' contents:\n{content}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                AgentError::ToolExecution(format!("File '{name}' not found")),
            ),
            Err(e) => Err(AgentError::ToolExecution(format!(
                "Could not read '{name}': {e}"
            ))),
        }
    }
}

/// Tool writing text to a file; input is `filepath|content`
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text to a file. Input: 'filepath|content' separated by pipe"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let Some((path, content)) = input.split_once('|') else {
            return Err(AgentError::ToolExecution(
                "Input must be in format 'filepath|content'".into(),
            ));
        };

        let name = sanitize(path).map_err(AgentError::ToolExecution)?;
        let content = content.trim();

        tokio::fs::write(&name, content).await.map_err(|e| {
            AgentError::ToolExecution(format!("Could not write '{name}': {e}"))
        })?;

        Ok(format!(
            "Successfully wrote {} bytes to '{name}'",
            content.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize("/etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize("../../secret.txt").unwrap(), "secret.txt");
        assert_eq!(sanitize("plain.txt").unwrap(), "plain.txt");
        assert!(sanitize("..").is_err());
        assert!(sanitize("/").is_err());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let name = "reagent_file_tool_roundtrip.txt";

        let written = WriteFileTool
            .invoke(&format!("{name}|hello from the agent"))
            .await
            .unwrap();
        assert!(written.contains(name));

        let read = ReadFileTool.invoke(name).await.unwrap();
        assert!(read.starts_with(&format!("File '{name}' contents:")));
        assert!(read.contains("hello from the agent"));

        tokio::fs::remove_file(name).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = ReadFileTool
            .invoke("reagent_definitely_not_here.txt")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_write_requires_pipe() {
        let err = WriteFileTool.invoke("no separator here").await.unwrap_err();
        assert!(err.to_string().contains("filepath|content"));
    }
}
