//! Tool registry - native tools and their handlers
//!
//! Holds in-process tool definitions in registration order and resolves a
//! tool name to its handler.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::agent::Agent;
use crate::core::{default_schema, BatonError, Result, ToolDefinition};
use crate::tools::delegate::Delegate;
use crate::tools::remote::RemoteHandle;

/// Arguments handed to a native tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    /// Input was exactly `{"query": ...}`: the single positional value
    Query(String),
    /// Any other input object, passed field by field
    Named(Map<String, Value>),
}

impl ToolArgs {
    /// Split tool input into positional or named arguments
    pub fn from_input(input: &Value) -> Result<Self> {
        let fields = input
            .as_object()
            .ok_or_else(|| BatonError::tool(format!("tool input must be a JSON object, got {}", input)))?;

        if fields.len() == 1 {
            if let Some(query) = fields.get("query") {
                let query = match query {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Ok(Self::Query(query));
            }
        }

        Ok(Self::Named(fields.clone()))
    }

    /// The query text, whether passed positionally or as a named field
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Query(query) => Some(query.as_str()),
            Self::Named(fields) => fields.get("query").and_then(Value::as_str),
        }
    }

    /// Get a string argument by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self {
            Self::Query(query) if key == "query" => Some(query.as_str()),
            Self::Query(_) => None,
            Self::Named(fields) => fields.get(key).and_then(Value::as_str),
        }
    }

    /// Deserialize named arguments into a typed parameter struct
    pub fn parse<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let value = match self {
            Self::Query(query) => serde_json::json!({ "query": query }),
            Self::Named(fields) => Value::Object(fields.clone()),
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// An in-process tool
#[async_trait]
pub trait NativeTool: Send + Sync {
    /// Run the tool; any JSON value is accepted and rendered as text
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value>;
}

/// Native tool backed by a plain closure
pub struct FnTool<F>(F);

impl<F> FnTool<F>
where
    F: Fn(ToolArgs) -> anyhow::Result<Value> + Send + Sync,
{
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> NativeTool for FnTool<F>
where
    F: Fn(ToolArgs) -> anyhow::Result<Value> + Send + Sync,
{
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value> {
        (self.0)(args)
    }
}

/// How a tool name is executed
#[derive(Clone)]
pub enum ToolHandler {
    /// In-process callable
    Native(Arc<dyn NativeTool>),
    /// Tool living on a remote server session of the current invocation
    Remote(RemoteHandle),
}

impl fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => f.write_str("Native(..)"),
            Self::Remote(handle) => f.debug_tuple("Remote").field(handle).finish(),
        }
    }
}

/// Registry of native tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    /// Definitions in registration order
    definitions: Vec<ToolDefinition>,
    /// Handlers, parallel to `definitions`
    handlers: Vec<Arc<dyn NativeTool>>,
    /// Name to position
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; without a schema the tool takes a single `query`
    /// string. Re-registering a name replaces its handler in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Option<Value>,
        handler: Arc<dyn NativeTool>,
    ) {
        let definition = ToolDefinition::new(
            name,
            description,
            schema.unwrap_or_else(default_schema),
        );

        match self.index.get(&definition.name).copied() {
            Some(position) => {
                tracing::debug!("Replacing native tool {}", definition.name);
                self.definitions[position] = definition;
                self.handlers[position] = handler;
            }
            None => {
                self.index
                    .insert(definition.name.clone(), self.definitions.len());
                self.definitions.push(definition);
                self.handlers.push(handler);
            }
        }
    }

    /// Register a closure as a tool
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Option<Value>,
        f: F,
    ) where
        F: Fn(ToolArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(name, description, schema, Arc::new(FnTool(f)));
    }

    /// Expose another agent as the tool `ask_<agent name>`
    pub fn register_agent(&mut self, agent: Agent, description: impl Into<String>) {
        let name = format!("ask_{}", agent.name());
        self.register(name, description, None, Arc::new(Delegate::new(agent)));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Option<Value>,
        handler: Arc<dyn NativeTool>,
    ) -> Self {
        self.register(name, description, schema, handler);
        self
    }

    /// Builder-style [`register_agent`](Self::register_agent)
    pub fn with_agent(mut self, agent: Agent, description: impl Into<String>) -> Self {
        self.register_agent(agent, description);
        self
    }

    /// Tool definitions in registration order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Resolve a name to its handler
    pub fn resolve(&self, name: &str) -> Result<ToolHandler> {
        self.index
            .get(name)
            .map(|&position| ToolHandler::Native(Arc::clone(&self.handlers[position])))
            .ok_or_else(|| BatonError::ToolNotFound(name.to_string()))
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered tool names in order
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_fn("echo", "Echo the query", None, |args| {
            Ok(Value::from(args.query().unwrap_or_default()))
        });
        registry
    }

    #[test]
    fn test_default_schema_applied() {
        let registry = echo_registry();
        assert_eq!(registry.definitions()[0].input_schema, default_schema());
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = echo_registry();
        registry.register_fn("b_tool", "b", Some(json!({"type": "object"})), |_| Ok(json!(1)));
        registry.register_fn("a_tool", "a", None, |_| Ok(json!(2)));

        assert_eq!(registry.names(), vec!["echo", "b_tool", "a_tool"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = echo_registry();
        registry.register_fn("echo", "Shout the query", None, |_| Ok(json!("LOUD")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.definitions()[0].description, "Shout the query");

        let ToolHandler::Native(handler) = registry.resolve("echo").unwrap() else {
            panic!("expected native handler");
        };
        let out = tokio_test::block_on(handler.call(ToolArgs::Query("x".into()))).unwrap();
        assert_eq!(out, json!("LOUD"));
    }

    #[test]
    fn test_resolve_missing() {
        let err = echo_registry().resolve("ghost_tool").unwrap_err();
        assert!(matches!(err, BatonError::ToolNotFound(ref n) if n == "ghost_tool"));
    }

    #[test]
    fn test_args_query_shortcut() {
        let args = ToolArgs::from_input(&json!({"query": "x"})).unwrap();
        assert_eq!(args, ToolArgs::Query("x".into()));
    }

    #[test]
    fn test_args_named() {
        let args = ToolArgs::from_input(&json!({"a": 1, "b": 2})).unwrap();
        let ToolArgs::Named(fields) = &args else {
            panic!("expected named args");
        };
        assert_eq!(fields["a"], 1);
        assert_eq!(fields["b"], 2);

        let with_query = ToolArgs::from_input(&json!({"query": "x", "limit": 3})).unwrap();
        assert!(matches!(with_query, ToolArgs::Named(_)));
        assert_eq!(with_query.query(), Some("x"));
    }

    #[test]
    fn test_args_reject_non_object() {
        assert!(ToolArgs::from_input(&json!("bare")).is_err());
    }

    #[test]
    fn test_args_parse_typed() {
        #[derive(serde::Deserialize)]
        struct Params {
            filename: String,
        }

        let args = ToolArgs::from_input(&json!({"filename": "a.txt", "content": "hi"})).unwrap();
        let params: Params = args.parse().unwrap();
        assert_eq!(params.filename, "a.txt");
    }
}
