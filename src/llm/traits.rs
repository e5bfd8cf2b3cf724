//! Inference backend trait and the request/response it exchanges
//!
//! The request mirrors a Converse-style API: full message history, system
//! prompt blocks, inference options, and an optional tool configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Message, Result, ToolDefinition};

/// One round's request to the inference backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    pub model_id: String,
    pub messages: Vec<Message>,
    pub system: Vec<SystemBlock>,
    pub inference_config: InferenceConfig,
    /// Omitted entirely when the merged tool set is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

impl ConverseRequest {
    /// Build a request; an empty tool list leaves `tool_config` unset
    pub fn new(
        model_id: impl Into<String>,
        messages: Vec<Message>,
        system_prompt: impl Into<String>,
        temperature: f32,
        tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            system: vec![SystemBlock {
                text: system_prompt.into(),
            }],
            inference_config: InferenceConfig { temperature },
            tool_config: (!tools.is_empty()).then_some(ToolConfig { tools }),
        }
    }

    /// System prompt blocks joined with newlines
    pub fn system_prompt(&self) -> String {
        self.system
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool definitions offered this round
    pub fn tools(&self) -> &[ToolDefinition] {
        self.tool_config
            .as_ref()
            .map(|config| config.tools.as_slice())
            .unwrap_or_default()
    }
}

/// A system prompt block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemBlock {
    pub text: String,
}

/// Options for generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub temperature: f32,
}

/// Tools offered to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub tools: Vec<ToolDefinition>,
}

/// Response from the inference backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverseResponse {
    pub output: ConverseOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ConverseResponse {
    /// Wrap an assistant message as a response
    pub fn new(message: Message) -> Self {
        Self {
            output: ConverseOutput { message },
            usage: None,
        }
    }
}

/// Output envelope holding the assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverseOutput {
    pub message: Message,
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Trait for inference backends
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one request/response round
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse>;

    /// Get the backend name
    fn name(&self) -> &str;
}
