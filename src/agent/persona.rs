//! Agent - a named persona bound to a model, a tool set, and a backend
//!
//! Agents hold no conversation state between invocations. Every call to
//! [`Agent::invoke`] opens its own remote tool sessions, runs a fresh loop,
//! and tears the sessions down before returning.

use std::fmt;
use std::sync::Arc;

use crate::agent::runner::{ConversationLoop, Invocation};
use crate::core::config::AgentConfig;
use crate::core::{BatonError, Result};
use crate::llm::InferenceBackend;
use crate::tools::{
    McpSessionFactory, RemoteToolConnector, ServerDescriptor, SessionFactory, ToolDispatcher,
    ToolRegistry,
};

const DEFAULT_MAX_ROUNDS: usize = 10;

/// Loop settings applied to every invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    /// Maximum backend rounds per invocation
    pub max_rounds: usize,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            temperature: 0.0,
        }
    }
}

/// A configured agent; cheap to clone
#[derive(Clone)]
pub struct Agent {
    name: String,
    model_id: String,
    system_prompt: String,
    tools: Arc<ToolRegistry>,
    servers: Vec<ServerDescriptor>,
    sessions: Arc<dyn SessionFactory>,
    backend: Arc<dyn InferenceBackend>,
    settings: AgentSettings,
}

impl Agent {
    /// Start building an agent
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Native tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Remote servers attached on each invocation
    pub fn servers(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    pub fn backend(&self) -> &dyn InferenceBackend {
        self.backend.as_ref()
    }

    pub fn max_rounds(&self) -> usize {
        self.settings.max_rounds
    }

    pub fn temperature(&self) -> f32 {
        self.settings.temperature
    }

    /// Run one invocation and return the structured outcome
    ///
    /// Remote sessions are opened before the first round and always closed
    /// afterwards, whether the loop succeeded or not.
    #[tracing::instrument(name = "invoke", skip_all, fields(agent = %self.name))]
    pub async fn try_invoke(&self, prompt: &str) -> Result<Invocation> {
        tracing::info!(model = %self.model_id, "Invocation started");

        let mut connector =
            RemoteToolConnector::discover_with(&self.servers, self.sessions.as_ref()).await?;
        let outcome = self.run(prompt, &connector).await;
        connector.shutdown().await;

        match &outcome {
            Ok(invocation) => {
                tracing::info!(rounds = invocation.rounds, "Invocation finished")
            }
            Err(e) => tracing::error!("Invocation failed: {}", e),
        }
        outcome
    }

    /// Run the loop against an already connected set of remote tools
    pub async fn run(&self, prompt: &str, remote: &RemoteToolConnector) -> Result<Invocation> {
        let dispatcher = ToolDispatcher::new(&self.tools, remote);
        ConversationLoop::new(self, dispatcher).run(prompt).await
    }

    /// Run one invocation; failures come back as `Error: <detail>`
    pub async fn invoke(&self, prompt: &str) -> String {
        match self.try_invoke(prompt).await {
            Ok(invocation) => invocation.text,
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Blocking form of [`Agent::invoke`] for callers outside a runtime
    ///
    /// Panics if called from within an async runtime.
    pub fn invoke_blocking(&self, prompt: &str) -> String {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.invoke(prompt)),
            Err(e) => format!("Error: {}", BatonError::from(e)),
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model_id", &self.model_id)
            .field("tools", &self.tools.names())
            .field(
                "servers",
                &self.servers.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    name: String,
    model_id: Option<String>,
    system_prompt: String,
    tools: ToolRegistry,
    servers: Vec<ServerDescriptor>,
    sessions: Arc<dyn SessionFactory>,
    backend: Option<Arc<dyn InferenceBackend>>,
    settings: AgentSettings,
}

impl AgentBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_id: None,
            system_prompt: String::new(),
            tools: ToolRegistry::new(),
            servers: Vec::new(),
            sessions: Arc::new(McpSessionFactory),
            backend: None,
            settings: AgentSettings::default(),
        }
    }

    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Replace the native tool set
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Attach a remote tool server, connected per invocation
    pub fn server(mut self, server: ServerDescriptor) -> Self {
        self.servers.push(server);
        self
    }

    /// How attached servers are opened; MCP over stdio by default
    pub fn session_factory(mut self, sessions: Arc<dyn SessionFactory>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn InferenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Round cap; values below one are raised to one
    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.settings.max_rounds = max_rounds.max(1);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.settings.temperature = temperature;
        self
    }

    /// Take loop settings from configuration
    pub fn settings(self, config: &AgentConfig) -> Self {
        self.max_rounds(config.max_rounds)
            .temperature(config.temperature)
    }

    pub fn build(self) -> Result<Agent> {
        let backend = self.backend.ok_or_else(|| {
            BatonError::config(format!("agent '{}' has no inference backend", self.name))
        })?;
        let model_id = self
            .model_id
            .ok_or_else(|| BatonError::config(format!("agent '{}' has no model", self.name)))?;

        Ok(Agent {
            name: self.name,
            model_id,
            system_prompt: self.system_prompt,
            tools: Arc::new(self.tools),
            servers: self.servers,
            sessions: self.sessions,
            backend,
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentBlock, ErrorKind, Message, ToolUse};
    use crate::llm::ScriptedBackend;
    use crate::tools::remote::fake::FakeSession;
    use serde_json::json;

    fn agent(backend: Arc<ScriptedBackend>, tools: ToolRegistry) -> Agent {
        Agent::builder("tester")
            .model("test-model")
            .system_prompt("You test things.")
            .tools(tools)
            .backend(backend)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_backend() {
        let err = Agent::builder("lonely").model("m").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_settings_from_config() {
        let config = AgentConfig {
            max_rounds: 0,
            temperature: 0.3,
            debug: false,
        };
        let agent = Agent::builder("a")
            .model("m")
            .settings(&config)
            .backend(Arc::new(ScriptedBackend::new()))
            .build()
            .unwrap();

        assert_eq!(agent.max_rounds(), 1);
        assert_eq!(agent.temperature(), 0.3);
    }

    #[tokio::test]
    async fn test_text_reply_finishes_in_one_round() {
        let backend = Arc::new(ScriptedBackend::new().reply_text("4"));
        let invocation = agent(Arc::clone(&backend), ToolRegistry::new())
            .try_invoke("What's 2+2")
            .await
            .unwrap();

        assert_eq!(invocation.text, "4");
        assert_eq!(invocation.rounds, 1);
        assert_eq!(invocation.messages.len(), 2);

        let requests = backend.requests();
        let request = &requests[0];
        assert_eq!(request.model_id, "test-model");
        assert_eq!(request.system_prompt(), "You test things.");
        assert_eq!(request.inference_config.temperature, 0.0);
        assert!(request.tool_config.is_none());
    }

    #[tokio::test]
    async fn test_remote_tools_join_the_loop() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply_tool_use("t1", "read_doc", json!({"query": "s3"}))
                .reply_text("done"),
        );
        let agent = agent(Arc::clone(&backend), ToolRegistry::new());

        let mut remote = RemoteToolConnector::new();
        remote
            .attach(Box::new(FakeSession::new("docs", &["read_doc"])))
            .await
            .unwrap();

        let invocation = agent.run("look it up", &remote).await.unwrap();
        assert_eq!(invocation.text, "done");

        let results = invocation.messages[2].results();
        assert_eq!(results[0].text(), "from docs");
        assert_eq!(backend.requests()[0].tools()[0].name, "read_doc");
    }

    #[tokio::test]
    async fn test_round_limit_stops_before_running_tools() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut tools = ToolRegistry::new();
        tools.register_fn("tick", "Count", None, move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(json!("ticked"))
        });

        let backend = Arc::new(
            ScriptedBackend::new()
                .reply_tool_use("a", "tick", json!({}))
                .reply_tool_use("b", "tick", json!({})),
        );
        let agent = Agent::builder("looper")
            .model("m")
            .tools(tools)
            .max_rounds(2)
            .backend(backend.clone())
            .build()
            .unwrap();

        let err = agent.try_invoke("go").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RoundLimit);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_invoke_folds_backend_failure() {
        let backend = Arc::new(ScriptedBackend::new().fail("connection refused"));
        let text = agent(backend, ToolRegistry::new()).invoke("hi").await;

        assert!(text.starts_with("Error: "));
        assert!(text.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_mixed_reply_text_is_kept_in_history() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(Message::assistant(vec![
                    ContentBlock::Text("checking".into()),
                    ContentBlock::ToolUse(ToolUse::new("t1", "ghost_tool", json!({}))),
                ]))
                .reply_text("gave up"),
        );
        let invocation = agent(backend, ToolRegistry::new())
            .try_invoke("try it")
            .await
            .unwrap();

        assert_eq!(invocation.text, "gave up");
        assert_eq!(invocation.messages[1].text(), "checking");
        let results = invocation.messages[2].results();
        assert!(results[0].is_error());
        assert_eq!(results[0].text(), "Error: Tool ghost_tool not found.");
    }
}
