//! Baton - multi-agent orchestration over a tool-using inference backend
//!
//! Each agent is a named persona (system prompt + tools) that converses with
//! the backend in rounds, running the tools the backend asks for until it
//! answers in plain text. A tool can itself be another agent, so agents
//! compose into delegation trees.
//!
//! # Architecture
//!
//! - **Core**: Message types, configuration, and error handling
//! - **LLM**: Inference backend abstraction with Ollama and scripted implementations
//! - **Tools**: Native registry, remote tool servers, dispatch, and delegation
//! - **Agent**: Agent construction and the conversation loop
//! - **Team**: The orchestrator and its specialist agents
//! - **CLI**: Command-line REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use baton::{llm::OllamaBackend, Config, Team};
//!
//! #[tokio::main]
//! async fn main() -> baton::Result<()> {
//!     let config = Config::load();
//!     let backend = Arc::new(OllamaBackend::from_config(&config)?);
//!     let orchestrator = Team::new(config, backend).orchestrator()?;
//!
//!     println!("{}", orchestrator.invoke("Write hello.txt saying hi").await);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod team;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, Invocation};
pub use cli::Repl;
pub use core::{BatonError, Config, ErrorKind, Result};
pub use team::Team;
