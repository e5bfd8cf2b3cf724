//! Delegation - an entire agent exposed as a single-input tool
//!
//! Each call runs a fresh, independent conversation on the child agent and
//! hands back its final text.

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::Agent;
use crate::tools::registry::{NativeTool, ToolArgs};

/// Tool handler that forwards its query to a child agent
#[derive(Debug, Clone)]
pub struct Delegate {
    agent: Agent,
}

impl Delegate {
    /// Wrap a child agent
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// The child agent
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[async_trait]
impl NativeTool for Delegate {
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value> {
        let query = args
            .query()
            .ok_or_else(|| anyhow::anyhow!("ask_{} expects a `query` string", self.agent.name()))?;

        tracing::info!(agent = %self.agent.name(), "Delegating task");
        Ok(Value::String(self.agent.invoke(query).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedBackend;
    use serde_json::Map;
    use std::sync::Arc;

    fn child(backend: Arc<ScriptedBackend>) -> Agent {
        Agent::builder("helper")
            .model("test-model")
            .system_prompt("You help.")
            .backend(backend)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_forwards_query_to_child() {
        let backend = Arc::new(ScriptedBackend::new().reply_text("child says hi"));
        let delegate = Delegate::new(child(Arc::clone(&backend)));

        let out = delegate.call(ToolArgs::Query("greet".into())).await.unwrap();
        assert_eq!(out, Value::String("child says hi".into()));

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].text(), "greet");
    }

    #[tokio::test]
    async fn test_requires_query() {
        let backend = Arc::new(ScriptedBackend::new());
        let delegate = Delegate::new(child(Arc::clone(&backend)));

        assert!(delegate.call(ToolArgs::Named(Map::new())).await.is_err());
        assert_eq!(backend.calls(), 0);
    }
}
