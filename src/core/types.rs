//! Shared types used across Baton modules
//!
//! Contains the conversation model (messages and content blocks) and tool
//! definitions, serialized in the shape the inference backend expects.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Sender of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Ordered content blocks
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message holding a single text block
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Create an assistant message from content blocks
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Create an assistant message holding a single text block
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![ContentBlock::Text(text.into())])
    }

    /// Create the user message that answers a batch of tool uses
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: results.into_iter().map(ContentBlock::ToolResult).collect(),
        }
    }

    /// Tool-use requests in block order
    pub fn tool_uses(&self) -> Vec<&ToolUse> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse(tool_use) => Some(tool_use),
                _ => None,
            })
            .collect()
    }

    /// Tool results in block order
    pub fn results(&self) -> Vec<&ToolResult> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult(result) => Some(result),
                _ => None,
            })
            .collect()
    }

    /// All text blocks joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One block of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
    Text(String),
    ToolUse(ToolUse),
    ToolResult(ToolResult),
}

/// A tool call requested by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    /// Identifier the matching result must echo back
    pub tool_use_id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub input: Value,
}

impl ToolUse {
    /// Create a new tool use
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            tool_use_id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// Text content of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolResultContent {
    Text(String),
}

/// Marks a tool result as a folded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Error,
}

/// Result of executing a tool, tagged with the originating tool-use id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: Vec<ToolResultContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ToolResultStatus>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: vec![ToolResultContent::Text(text.into())],
            status: None,
        }
    }

    /// Create a failed result; the text is still what the backend reads
    pub fn failure(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: vec![ToolResultContent::Text(text.into())],
            status: Some(ToolResultStatus::Error),
        }
    }

    /// Whether this result carries a folded failure
    pub fn is_error(&self) -> bool {
        self.status == Some(ToolResultStatus::Error)
    }

    /// Result text joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|ToolResultContent::Text(text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Definition of a tool that can be called by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Name of the tool, unique within one conversation
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Schema used when a tool supplies none: a single required `query` string
pub fn default_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string" }
        },
        "required": ["query"]
    })
}
