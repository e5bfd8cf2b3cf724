//! File tools - read and write files for the coder agent

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::tools::registry::{NativeTool, ToolArgs, ToolRegistry};

#[derive(Debug, Deserialize)]
struct ReadParams {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct WriteParams {
    filename: String,
    content: String,
}

/// Reads a file's contents
#[derive(Debug, Clone, Default)]
pub struct ReadFileTool;

/// Writes content to a file, replacing it
#[derive(Debug, Clone, Default)]
pub struct WriteFileTool;

#[async_trait]
impl NativeTool for ReadFileTool {
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value> {
        let params: ReadParams = args.parse()?;

        if !tokio::fs::try_exists(&params.filename).await? {
            return Ok(json!("File not found."));
        }

        match tokio::fs::read_to_string(&params.filename).await {
            Ok(content) => Ok(Value::String(content)),
            Err(e) => Ok(json!(format!("Error reading file: {}", e))),
        }
    }
}

#[async_trait]
impl NativeTool for WriteFileTool {
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value> {
        let params: WriteParams = args.parse()?;

        match tokio::fs::write(&params.filename, params.content).await {
            Ok(()) => Ok(json!(format!("Successfully wrote to {}", params.filename))),
            Err(e) => Ok(json!(format!("Error writing file: {}", e))),
        }
    }
}

/// Add `read_file` and `write_file` to a registry
pub fn register(registry: &mut ToolRegistry) {
    registry.register(
        "write_file",
        "Writes content to a file.",
        Some(json!({
            "type": "object",
            "properties": {
                "filename": {"type": "string", "description": "Name of the file to write"},
                "content": {"type": "string", "description": "Content to write"}
            },
            "required": ["filename", "content"]
        })),
        Arc::new(WriteFileTool),
    );

    registry.register(
        "read_file",
        "Reads content from a file.",
        Some(json!({
            "type": "object",
            "properties": {
                "filename": {"type": "string", "description": "Name of the file to read"}
            },
            "required": ["filename"]
        })),
        Arc::new(ReadFileTool),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn named(value: Value) -> ToolArgs {
        ToolArgs::from_input(&value).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        let path = path.to_string_lossy();

        let written = WriteFileTool
            .call(named(json!({"filename": path, "content": "hello"})))
            .await
            .unwrap();
        assert_eq!(written, json!(format!("Successfully wrote to {}", path)));

        let read = ReadFileTool.call(named(json!({"filename": path}))).await.unwrap();
        assert_eq!(read, json!("hello"));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.txt");

        let out = ReadFileTool
            .call(named(json!({"filename": path.to_string_lossy()})))
            .await
            .unwrap();
        assert_eq!(out, json!("File not found."));
    }

    #[tokio::test]
    async fn test_missing_argument_is_error() {
        assert!(WriteFileTool.call(named(json!({"filename": "x"}))).await.is_err());
    }

    #[test]
    fn test_register_order() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        assert_eq!(registry.names(), vec!["write_file", "read_file"]);
    }
}
