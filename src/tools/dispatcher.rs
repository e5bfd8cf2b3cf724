//! Tool dispatcher - routes tool calls to native or remote handlers
//!
//! Resolution is native-first. Every failure is folded into the result text
//! the backend reads; the conversation itself never aborts on a tool.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::core::{BatonError, Result, ToolDefinition, ToolResult, ToolUse};
use crate::tools::registry::{ToolArgs, ToolHandler, ToolRegistry};
use crate::tools::remote::RemoteToolConnector;

/// Merged view over one agent's native tools and one invocation's remote tools
#[derive(Debug, Clone, Copy)]
pub struct ToolDispatcher<'a> {
    native: &'a ToolRegistry,
    remote: &'a RemoteToolConnector,
}

impl<'a> ToolDispatcher<'a> {
    /// Create a dispatcher over both tool sources
    pub fn new(native: &'a ToolRegistry, remote: &'a RemoteToolConnector) -> Self {
        Self { native, remote }
    }

    /// Definitions presented to the backend: native first, then remote tools
    /// whose names are not already taken by a native tool
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions = self.native.definitions().to_vec();

        for tool in self.remote.definitions() {
            if self.native.contains(&tool.name) {
                tracing::warn!(
                    "Remote tool {} is shadowed by a native tool of the same name",
                    tool.name
                );
                continue;
            }
            definitions.push(tool.clone());
        }

        definitions
    }

    /// Resolve a name, native first
    pub fn resolve(&self, name: &str) -> Result<ToolHandler> {
        self.native.resolve(name).or_else(|_| {
            self.remote
                .resolve(name)
                .map(ToolHandler::Remote)
                .ok_or_else(|| BatonError::ToolNotFound(name.to_string()))
        })
    }

    /// Run a tool and return its text, or the typed failure
    pub async fn try_dispatch(&self, name: &str, input: &Value) -> Result<String> {
        match self.resolve(name)? {
            ToolHandler::Remote(handle) => self.remote.call(&handle, input).await,
            ToolHandler::Native(handler) => {
                let args = ToolArgs::from_input(input)?;
                let output = AssertUnwindSafe(handler.call(args))
                    .catch_unwind()
                    .await
                    .map_err(|payload| BatonError::tool(panic_message(payload.as_ref())))?
                    .map_err(|e| BatonError::tool(format!("{:#}", e)))?;
                Ok(render(output))
            }
        }
    }

    /// Run a tool; failures come back as their folded text
    pub async fn dispatch(&self, name: &str, input: &Value) -> String {
        match self.try_dispatch(name, input).await {
            Ok(text) => text,
            Err(e) => e.tool_result_text(),
        }
    }

    /// Execute one tool-use request into its tagged result
    pub async fn execute(&self, tool_use: &ToolUse) -> ToolResult {
        tracing::debug!(tool = %tool_use.name, id = %tool_use.tool_use_id, "Executing tool");

        match self.try_dispatch(&tool_use.name, &tool_use.input).await {
            Ok(text) => ToolResult::success(&tool_use.tool_use_id, text),
            Err(e) => {
                tracing::warn!(tool = %tool_use.name, "Tool failed: {}", e);
                ToolResult::failure(&tool_use.tool_use_id, e.tool_result_text())
            }
        }
    }
}

/// Message carried by a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}

/// Strings pass through untouched; any other value becomes its JSON text
fn render(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::remote::fake::FakeSession;
    use crate::tools::remote::{RemoteCallResult, RemoteContent};
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_fn("describe", "Describe the call", None, |args| match args {
            ToolArgs::Query(q) => Ok(json!(format!("positional:{}", q))),
            ToolArgs::Named(fields) => {
                let mut keys: Vec<_> = fields.keys().cloned().collect();
                keys.sort();
                Ok(json!(format!("named:{}", keys.join(","))))
            }
        });
        registry.register_fn("count", "Return a number", None, |_| Ok(json!({"count": 3})));
        registry.register_fn("explode", "Always fails", None, |_| {
            anyhow::bail!("disk quota exceeded")
        });
        registry.register_fn("search_docs", "Native search", None, |_| Ok(json!("native")));
        registry.register_fn("boom", "Always panics", None, |_| panic!("index out of bounds"));
        registry
    }

    async fn connector() -> RemoteToolConnector {
        let mut connector = RemoteToolConnector::new();
        connector
            .attach(Box::new(FakeSession::new("docs", &["search_docs", "read_doc"])))
            .await
            .unwrap();
        connector
    }

    #[tokio::test]
    async fn test_native_wins_name_collision() {
        let native = registry();
        let remote = connector().await;
        let dispatcher = ToolDispatcher::new(&native, &remote);

        assert_eq!(dispatcher.dispatch("search_docs", &json!({"query": "s3"})).await, "native");
        assert_eq!(dispatcher.dispatch("read_doc", &json!({})).await, "from docs");
    }

    #[tokio::test]
    async fn test_merged_definitions_unique_native_first() {
        let native = registry();
        let remote = connector().await;
        let names: Vec<String> = ToolDispatcher::new(&native, &remote)
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(
            names,
            vec!["describe", "count", "explode", "search_docs", "boom", "read_doc"]
        );
    }

    #[tokio::test]
    async fn test_query_shortcut_and_named_args() {
        let native = registry();
        let remote = RemoteToolConnector::new();
        let dispatcher = ToolDispatcher::new(&native, &remote);

        assert_eq!(
            dispatcher.dispatch("describe", &json!({"query": "x"})).await,
            "positional:x"
        );
        assert_eq!(
            dispatcher.dispatch("describe", &json!({"a": 1, "b": 2})).await,
            "named:a,b"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_text() {
        let native = registry();
        let remote = RemoteToolConnector::new();
        let dispatcher = ToolDispatcher::new(&native, &remote);

        assert_eq!(
            dispatcher.dispatch("ghost_tool", &json!({})).await,
            "Error: Tool ghost_tool not found."
        );
    }

    #[tokio::test]
    async fn test_native_failure_text() {
        let native = registry();
        let remote = RemoteToolConnector::new();
        let result = ToolDispatcher::new(&native, &remote)
            .execute(&ToolUse::new("t9", "explode", json!({"query": "go"})))
            .await;

        assert!(result.is_error());
        assert_eq!(result.tool_use_id, "t9");
        assert_eq!(result.text(), "Native Tool Error: disk quota exceeded");
    }

    #[tokio::test]
    async fn test_panicking_tool_is_folded() {
        let native = registry();
        let remote = RemoteToolConnector::new();
        let result = ToolDispatcher::new(&native, &remote)
            .execute(&ToolUse::new("t3", "boom", json!({})))
            .await;

        assert!(result.is_error());
        assert_eq!(result.text(), "Native Tool Error: index out of bounds");
    }

    #[tokio::test]
    async fn test_remote_error_result_is_failure() {
        let native = ToolRegistry::new();
        let mut session = FakeSession::new("docs", &["read_doc"]);
        session.reply = Ok(RemoteCallResult {
            content: vec![RemoteContent::text("no such page")],
            is_error: Some(true),
        });
        let mut remote = RemoteToolConnector::new();
        remote.attach(Box::new(session)).await.unwrap();

        let result = ToolDispatcher::new(&native, &remote)
            .execute(&ToolUse::new("t4", "read_doc", json!({})))
            .await;
        assert!(result.is_error());
        assert_eq!(result.text(), "MCP Error: no such page");
    }

    #[tokio::test]
    async fn test_remote_failure_text() {
        let native = ToolRegistry::new();
        let mut session = FakeSession::new("docs", &["read_doc"]);
        session.reply = Err("server crashed".into());
        let mut remote = RemoteToolConnector::new();
        remote.attach(Box::new(session)).await.unwrap();

        let text = ToolDispatcher::new(&native, &remote)
            .dispatch("read_doc", &json!({}))
            .await;
        assert!(text.starts_with("MCP Error: "));
        assert!(text.contains("server crashed"));
    }

    #[tokio::test]
    async fn test_non_string_output_is_stringified() {
        let native = registry();
        let remote = RemoteToolConnector::new();
        let text = ToolDispatcher::new(&native, &remote)
            .dispatch("count", &json!({}))
            .await;
        assert_eq!(text, r#"{"count":3}"#);
    }
}
