//! Custom error types for Baton
//!
//! One error enum for the whole crate, plus a flat [`ErrorKind`] so callers
//! can branch on the failure category without matching message text.

use thiserror::Error;

/// Main error type for Baton operations
#[derive(Error, Debug)]
pub enum BatonError {
    /// Inference call failed (throttling, malformed request, unreachable host)
    #[error("Backend error: {0}")]
    Backend(String),

    /// A remote tool server could not be started, initialized, or listed
    #[error("Tool server '{server}' failed: {detail}")]
    Discovery { server: String, detail: String },

    /// A native tool returned an error
    #[error("{0}")]
    ToolExecution(String),

    /// A remote tool call failed
    #[error("{0}")]
    RemoteTool(String),

    /// No handler is bound to the requested name
    #[error("Tool {0} not found.")]
    ToolNotFound(String),

    /// The backend kept requesting tools past the configured round cap
    #[error("Round limit of {0} reached before a final answer")]
    RoundLimit(usize),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Failure category of a [`BatonError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Backend,
    Discovery,
    ToolExecution,
    ToolNotFound,
    RoundLimit,
    Config,
    Other,
}

/// Convenience Result type for Baton operations
pub type Result<T> = std::result::Result<T, BatonError>;

impl BatonError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a discovery error for the named server
    pub fn discovery(server: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Discovery {
            server: server.into(),
            detail: detail.into(),
        }
    }

    /// Create a native tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a remote tool error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteTool(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Categorize this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Backend(_) | Self::Http(_) => ErrorKind::Backend,
            Self::Discovery { .. } => ErrorKind::Discovery,
            Self::ToolExecution(_) | Self::RemoteTool(_) => ErrorKind::ToolExecution,
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::RoundLimit(_) => ErrorKind::RoundLimit,
            Self::Config(_) => ErrorKind::Config,
            Self::Json(_) | Self::Io(_) | Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Re-tag any error raised while talking to the backend as a backend error
    pub fn into_backend(self) -> Self {
        match self {
            Self::Backend(_) => self,
            other => Self::Backend(other.to_string()),
        }
    }

    /// Text a tool failure is folded into when handed back to the backend
    pub fn tool_result_text(&self) -> String {
        match self {
            Self::ToolNotFound(name) => format!("Error: Tool {} not found.", name),
            Self::RemoteTool(detail) => format!("MCP Error: {}", detail),
            Self::ToolExecution(detail) => format!("Native Tool Error: {}", detail),
            other => format!("Error: {}", other),
        }
    }
}
