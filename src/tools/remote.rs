//! Remote tools - external MCP servers reached over a child-process transport
//!
//! A [`RemoteToolConnector`] lives for exactly one invocation: it spawns each
//! configured server, performs the handshake, lists its tools, and binds every
//! tool name to the session that serves it. [`RemoteToolConnector::shutdown`]
//! closes all sessions; handles are dead afterwards.

use async_trait::async_trait;
use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tokio::process::Command;

use crate::core::{BatonError, Result, ToolDefinition};

/// How to launch an external tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Name used in logs and config lookups
    pub name: String,
    /// Executable to spawn
    pub command: String,
    /// Arguments for the executable
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the child process
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl ServerDescriptor {
    /// Create a descriptor
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }

    /// Add an environment variable for the child process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// One content item of a remote tool result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl RemoteContent {
    /// A text item
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }

    /// A non-text item (image, resource, ...)
    pub fn other(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
        }
    }
}

/// Result of a remote tool call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCallResult {
    #[serde(default)]
    pub content: Vec<RemoteContent>,
    #[serde(default)]
    pub is_error: Option<bool>,
}

impl RemoteCallResult {
    /// Text items joined with newlines; other items are dropped
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|item| item.kind == "text")
            .filter_map(|item| item.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A live connection to one tool server
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Server this session talks to
    fn server_name(&self) -> &str;

    /// Enumerate the server's tools
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>>;

    /// Invoke a tool by its remote name
    async fn call_tool(&self, name: &str, input: &Value) -> Result<RemoteCallResult>;

    /// Release the session; must be safe to call more than once
    async fn close(&mut self);
}

/// MCP client session over a spawned child process
pub struct McpSession {
    server: String,
    service: Option<RunningService<RoleClient, ()>>,
}

impl McpSession {
    /// Spawn the server and perform the protocol handshake
    pub async fn connect(descriptor: &ServerDescriptor) -> Result<Self> {
        let mut command = Command::new(&descriptor.command);
        command.args(&descriptor.args).envs(&descriptor.env);

        let transport = TokioChildProcess::new(command).map_err(|e| {
            BatonError::discovery(
                &descriptor.name,
                format!("failed to spawn `{}`: {}", descriptor.command, e),
            )
        })?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| BatonError::discovery(&descriptor.name, format!("handshake failed: {}", e)))?;

        tracing::debug!(server = %descriptor.name, "Tool server initialized");

        Ok(Self {
            server: descriptor.name.clone(),
            service: Some(service),
        })
    }

    fn service(&self) -> Result<&RunningService<RoleClient, ()>> {
        self.service
            .as_ref()
            .ok_or_else(|| BatonError::remote(format!("session to '{}' is closed", self.server)))
    }
}

#[async_trait]
impl RemoteSession for McpSession {
    fn server_name(&self) -> &str {
        &self.server
    }

    async fn list_tools(&self) -> Result<Vec<ToolDefinition>> {
        let tools = self
            .service()?
            .list_all_tools()
            .await
            .map_err(|e| BatonError::discovery(&self.server, format!("list_tools failed: {}", e)))?;

        Ok(tools
            .into_iter()
            .map(|tool| {
                ToolDefinition::new(
                    tool.name.to_string(),
                    tool.description.as_deref().unwrap_or_default(),
                    Value::Object((*tool.input_schema).clone()),
                )
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, input: &Value) -> Result<RemoteCallResult> {
        let params = serde_json::from_value(json!({ "name": name, "arguments": input }))
            .map_err(|e| BatonError::remote(format!("invalid arguments for {}: {}", name, e)))?;

        let result = self
            .service()?
            .call_tool(params)
            .await
            .map_err(|e| BatonError::remote(e.to_string()))?;

        let value = serde_json::to_value(&result).map_err(|e| BatonError::remote(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| BatonError::remote(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(service) = self.service.take() {
            match service.cancel().await {
                Ok(reason) => tracing::debug!(server = %self.server, ?reason, "Tool server closed"),
                Err(e) => tracing::warn!(server = %self.server, "Tool server did not shut down cleanly: {}", e),
            }
        }
    }
}

/// Opens sessions for server descriptors
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn connect(&self, server: &ServerDescriptor) -> Result<Box<dyn RemoteSession>>;
}

/// Spawns each server as a child process and speaks MCP over stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct McpSessionFactory;

#[async_trait]
impl SessionFactory for McpSessionFactory {
    async fn connect(&self, server: &ServerDescriptor) -> Result<Box<dyn RemoteSession>> {
        Ok(Box::new(McpSession::connect(server).await?))
    }
}

/// Binding of a tool name to the session that serves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHandle {
    session: usize,
    server: String,
    remote_name: String,
}

impl RemoteHandle {
    /// Server hosting the tool
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Tool name on the server
    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }
}

/// Per-invocation set of remote tool sessions
#[derive(Default)]
pub struct RemoteToolConnector {
    sessions: Vec<Box<dyn RemoteSession>>,
    definitions: Vec<ToolDefinition>,
    bindings: HashMap<String, usize>,
}

impl RemoteToolConnector {
    /// Create a connector with no sessions
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to every server over MCP and collect its tools
    pub async fn discover(servers: &[ServerDescriptor]) -> Result<Self> {
        Self::discover_with(servers, &McpSessionFactory).await
    }

    /// Connect to every server through `factory`; on any failure the
    /// sessions opened so far are closed and the error is returned
    pub async fn discover_with(
        servers: &[ServerDescriptor],
        factory: &dyn SessionFactory,
    ) -> Result<Self> {
        let mut connector = Self::new();

        for server in servers {
            let attached = match factory.connect(server).await {
                Ok(session) => connector.attach(session).await.map(|_| ()),
                Err(e) => Err(e),
            };

            if let Err(e) = attached {
                connector.shutdown().await;
                return Err(e);
            }
        }

        Ok(connector)
    }

    /// Take ownership of a session and bind its tools. The session is kept
    /// even if listing fails so that [`shutdown`](Self::shutdown) releases it.
    pub async fn attach(&mut self, session: Box<dyn RemoteSession>) -> Result<usize> {
        let position = self.sessions.len();
        self.sessions.push(session);
        let server = self.sessions[position].server_name().to_string();

        let tools = self.sessions[position]
            .list_tools()
            .await
            .map_err(|e| match e {
                BatonError::Discovery { .. } => e,
                other => BatonError::discovery(&server, other.to_string()),
            })?;

        tracing::info!(server = %server, tools = tools.len(), "Discovered remote tools");

        for tool in tools {
            if let Some(previous) = self.bindings.insert(tool.name.clone(), position) {
                tracing::warn!(
                    "Remote tool {} from '{}' replaces the one from '{}'",
                    tool.name,
                    server,
                    self.sessions[previous].server_name()
                );
            }

            match self.definitions.iter_mut().find(|d| d.name == tool.name) {
                Some(existing) => *existing = tool,
                None => self.definitions.push(tool),
            }
        }

        Ok(position)
    }

    /// Remote tool definitions in discovery order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Resolve a name to its remote handle
    pub fn resolve(&self, name: &str) -> Option<RemoteHandle> {
        self.bindings.get(name).map(|&session| RemoteHandle {
            session,
            server: self.sessions[session].server_name().to_string(),
            remote_name: name.to_string(),
        })
    }

    /// Call a remote tool and return its text content
    pub async fn call(&self, handle: &RemoteHandle, input: &Value) -> Result<String> {
        let session = self
            .sessions
            .get(handle.session)
            .ok_or_else(|| BatonError::remote(format!("session to '{}' is closed", handle.server)))?;

        let result = session
            .call_tool(&handle.remote_name, input)
            .await
            .map_err(|e| match e {
                BatonError::RemoteTool(_) => e,
                other => BatonError::remote(other.to_string()),
            })?;

        if result.is_error == Some(true) {
            return Err(BatonError::remote(result.text()));
        }

        Ok(result.text())
    }

    /// Number of open sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Close every session and drop all bindings
    pub async fn shutdown(&mut self) {
        for session in &mut self.sessions {
            session.close().await;
        }
        self.sessions.clear();
        self.definitions.clear();
        self.bindings.clear();
    }
}

impl fmt::Debug for RemoteToolConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteToolConnector")
            .field("sessions", &self.sessions.len())
            .field("tools", &self.definitions.len())
            .finish()
    }
}
