//! Ollama backend implementation
//!
//! Translates Converse-style requests to the Ollama `/api/chat` format and
//! the replies back into content blocks.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::core::{BatonError, Config, ContentBlock, Message, Result, Role, ToolUse};
use crate::llm::traits::{ConverseRequest, ConverseResponse, InferenceBackend, TokenUsage};

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    base_url: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool<'a>>,
    options: OllamaOptions,
    stream: bool,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OllamaToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl OllamaMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
            tool_calls: None,
            tool_name: None,
        }
    }
}

/// Ollama tool call format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

/// Ollama function in tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// Ollama tool declaration
#[derive(Debug, Serialize)]
struct OllamaTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OllamaToolSpec<'a>,
}

#[derive(Debug, Serialize)]
struct OllamaToolSpec<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaBackend {
    /// Create a backend from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.backend_url(),
        })
    }

    /// Create a backend with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(300)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Flatten the conversation into Ollama chat messages
    fn to_ollama_messages(request: &ConverseRequest) -> Vec<OllamaMessage> {
        let mut messages = vec![OllamaMessage::new("system", request.system_prompt())];
        let mut tool_names: HashMap<&str, &str> = HashMap::new();

        for message in &request.messages {
            match message.role {
                Role::Assistant => {
                    let calls: Vec<OllamaToolCall> = message
                        .tool_uses()
                        .into_iter()
                        .map(|tool_use| {
                            tool_names.insert(&tool_use.tool_use_id, &tool_use.name);
                            OllamaToolCall {
                                function: OllamaFunction {
                                    name: tool_use.name.clone(),
                                    arguments: tool_use.input.clone(),
                                },
                            }
                        })
                        .collect();

                    let mut out = OllamaMessage::new("assistant", message.text());
                    if !calls.is_empty() {
                        out.tool_calls = Some(calls);
                    }
                    messages.push(out);
                }
                Role::User => {
                    for result in message.results() {
                        let mut out = OllamaMessage::new("tool", result.text());
                        out.tool_name = tool_names
                            .get(result.tool_use_id.as_str())
                            .map(|name| name.to_string());
                        messages.push(out);
                    }

                    let text = message.text();
                    if !text.is_empty() {
                        messages.push(OllamaMessage::new("user", text));
                    }
                }
            }
        }

        messages
    }

    /// Convert an Ollama reply to a response, numbering tool calls after
    /// the ones already present in the history
    fn to_converse_response(request: &ConverseRequest, response: ChatResponse) -> ConverseResponse {
        let prior_calls: usize = request
            .messages
            .iter()
            .map(|message| message.tool_uses().len())
            .sum();

        let mut content = Vec::new();
        if !response.message.content.trim().is_empty() {
            content.push(ContentBlock::Text(response.message.content));
        }

        for (i, call) in response
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            content.push(ContentBlock::ToolUse(ToolUse::new(
                format!("call_{}", prior_calls + i),
                call.function.name,
                call.function.arguments,
            )));
        }

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (Some(input), Some(output)) => Some(TokenUsage {
                input_tokens: input,
                output_tokens: output,
                total_tokens: input + output,
            }),
            _ => None,
        };

        ConverseResponse {
            usage,
            ..ConverseResponse::new(Message::assistant(content))
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse> {
        let body = ChatRequest {
            model: &request.model_id,
            messages: Self::to_ollama_messages(request),
            tools: request
                .tools()
                .iter()
                .map(|tool| OllamaTool {
                    tool_type: "function",
                    function: OllamaToolSpec {
                        name: &tool.name,
                        description: &tool.description,
                        parameters: &tool.input_schema,
                    },
                })
                .collect(),
            options: OllamaOptions {
                temperature: request.inference_config.temperature,
            },
            stream: false,
        };

        tracing::debug!(
            model = %request.model_id,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BatonError::backend(format!(
                        "Cannot connect to Ollama at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    BatonError::backend(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BatonError::backend(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| BatonError::backend(e.to_string()))?;

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| BatonError::backend(format!("Failed to parse response: {}", e)))?;

        Ok(Self::to_converse_response(request, chat_response))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
