//! Configuration management for Baton
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/baton/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{BatonError, Result};
use crate::tools::remote::ServerDescriptor;

/// Main configuration for Baton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Inference backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Model configuration
    #[serde(default)]
    pub models: ModelConfig,
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Named remote tool servers agents can attach to
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerDescriptor>,
}

/// Inference server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model used by every agent unless overridden
    pub default: String,
    /// Model used by the orchestrator; falls back to `default`
    #[serde(default)]
    pub orchestrator: Option<String>,
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum backend rounds per invocation
    /// Default: 10
    pub max_rounds: usize,
    /// Sampling temperature sent with every request
    /// Default: 0.0
    pub temperature: f32,
    /// Whether to emit debug logs
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            models: ModelConfig::default(),
            agent: AgentConfig::default(),
            servers: default_servers(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 300,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default: env::var("BATON_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string()),
            orchestrator: env::var("BATON_ORCHESTRATOR_MODEL").ok(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: env::var("BATON_MAX_ROUNDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            temperature: 0.0,
            debug: env::var("BATON_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

fn default_servers() -> Vec<ServerDescriptor> {
    vec![ServerDescriptor::new(
        "aws-docs",
        "uvx",
        ["awslabs.aws-documentation-mcp-server"],
    )]
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("baton")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        Self::try_load(None).unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file, using defaults: {}", e);
            Self::default()
        })
    }

    /// Load `path`, or the default config file when it exists. A file that
    /// exists but cannot be read or parsed is an error.
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let path = Self::config_file();
                if path.exists() {
                    Self::load_from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BatonError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| BatonError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BatonError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| BatonError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| BatonError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| BatonError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Get the full backend API URL
    pub fn backend_url(&self) -> String {
        format!("http://{}:{}", self.backend.host, self.backend.port)
    }

    /// Model for the orchestrator agent
    pub fn orchestrator_model(&self) -> &str {
        self.models
            .orchestrator
            .as_deref()
            .unwrap_or(&self.models.default)
    }

    /// Look up a named tool server
    pub fn server(&self, name: &str) -> Option<&ServerDescriptor> {
        self.servers.iter().find(|s| s.name == name)
    }
}
