//! Scripted backend - replays canned replies
//!
//! Deterministic stand-in for a real inference service. Every request is
//! recorded so callers can inspect exactly what a conversation sent.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::core::{BatonError, ContentBlock, Message, Result, ToolUse};
use crate::llm::traits::{ConverseRequest, ConverseResponse, InferenceBackend};

/// Backend that answers from a fixed queue of replies
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<std::result::Result<Message, String>>>,
    requests: Mutex<Vec<ConverseRequest>>,
}

impl ScriptedBackend {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an assistant message
    pub fn reply(self, message: Message) -> Self {
        self.push(Ok(message));
        self
    }

    /// Queue a text-only assistant message
    pub fn reply_text(self, text: impl Into<String>) -> Self {
        self.reply(Message::assistant_text(text))
    }

    /// Queue an assistant message with a single tool use
    pub fn reply_tool_use(self, id: &str, name: &str, input: Value) -> Self {
        self.reply(Message::assistant(vec![ContentBlock::ToolUse(ToolUse::new(
            id, name, input,
        ))]))
    }

    /// Queue a backend failure
    pub fn fail(self, detail: impl Into<String>) -> Self {
        self.push(Err(detail.into()));
        self
    }

    fn push(&self, reply: std::result::Result<Message, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<ConverseRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Number of replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse> {
        self.requests
            .lock()
            .map_err(|_| BatonError::backend("scripted backend poisoned"))?
            .push(request.clone());

        let next = self
            .replies
            .lock()
            .map_err(|_| BatonError::backend("scripted backend poisoned"))?
            .pop_front();

        match next {
            Some(Ok(message)) => Ok(ConverseResponse::new(message)),
            Some(Err(detail)) => Err(BatonError::backend(detail)),
            None => Err(BatonError::backend("scripted backend has no replies left")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let backend = ScriptedBackend::new()
            .reply_tool_use("t1", "lookup", json!({"query": "x"}))
            .reply_text("done");
        let request = ConverseRequest::new("m", vec![Message::user("go")], "sys", 0.0, vec![]);

        let first = backend.converse(&request).await.unwrap();
        assert_eq!(first.output.message.tool_uses().len(), 1);

        let second = backend.converse(&request).await.unwrap();
        assert_eq!(second.output.message.text(), "done");

        assert_eq!(backend.calls(), 2);
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_is_backend_error() {
        let backend = ScriptedBackend::new().fail("throttled");
        let request = ConverseRequest::new("m", vec![], "sys", 0.0, vec![]);

        let err = backend.converse(&request).await.unwrap_err();
        assert!(err.to_string().contains("throttled"));

        let err = backend.converse(&request).await.unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Backend);
    }
}
