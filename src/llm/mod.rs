//! LLM module - inference backend integrations
//!
//! Provides the backend abstraction with an Ollama implementation and a
//! scripted backend for offline runs and tests.

pub mod ollama;
pub mod scripted;
pub mod traits;

pub use ollama::OllamaBackend;
pub use scripted::ScriptedBackend;
pub use traits::{
    ConverseOutput, ConverseRequest, ConverseResponse, InferenceBackend, InferenceConfig,
    SystemBlock, TokenUsage, ToolConfig,
};
