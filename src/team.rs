//! Team - the orchestrator and its specialist agents
//!
//! The orchestrator owns no domain tools of its own. It delegates through
//! `ask_coder` and `ask_researcher`, each of which runs a whole child agent.

use std::sync::Arc;

use crate::agent::Agent;
use crate::core::{Config, Result};
use crate::llm::InferenceBackend;
use crate::tools::{files, ToolRegistry};

/// Name of the documentation server the researcher attaches to
pub const RESEARCH_SERVER: &str = "aws-docs";

const CODER_PROMPT: &str = "You are a Coder Agent. You can read and write files.";

const RESEARCHER_PROMPT: &str =
    "You are an AWS Researcher. Use the available tools to search AWS documentation.";

const ORCHESTRATOR_PROMPT: &str = r#"You are the **Baton Orchestrator**.
You are the leader of a multi-agent team. Your goal is to solve complex DevOps tasks
by delegating work to your specialized agents.

### Your Team:
1. **Coder**: Handles file operations and script writing.
2. **Researcher**: Provides AWS best practices and documentation lookups.

### Workflow:
1. Analyze the user's request.
2. Break it down into steps.
3. Call the appropriate agent for each step.
4. Synthesize the results and report back to the user.

### Example:
User: "Write a script that lists my S3 buckets."
You:
- Call `ask_researcher` to find the right API.
- Call `ask_coder` to write the script to a file."#;

/// Builds the agent tree from one configuration and one backend
#[derive(Clone)]
pub struct Team {
    config: Config,
    backend: Arc<dyn InferenceBackend>,
}

impl Team {
    pub fn new(config: Config, backend: Arc<dyn InferenceBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// File-handling agent with `write_file` and `read_file`
    pub fn coder(&self) -> Result<Agent> {
        let mut tools = ToolRegistry::new();
        files::register(&mut tools);

        Agent::builder("coder")
            .model(&self.config.models.default)
            .system_prompt(CODER_PROMPT)
            .tools(tools)
            .settings(&self.config.agent)
            .backend(Arc::clone(&self.backend))
            .build()
    }

    /// Documentation agent backed by the configured research server
    pub fn researcher(&self) -> Result<Agent> {
        let mut builder = Agent::builder("researcher")
            .model(&self.config.models.default)
            .system_prompt(RESEARCHER_PROMPT)
            .settings(&self.config.agent)
            .backend(Arc::clone(&self.backend));

        match self.config.server(RESEARCH_SERVER) {
            Some(server) => builder = builder.server(server.clone()),
            None => tracing::warn!(
                "No '{}' server configured; researcher has no tools",
                RESEARCH_SERVER
            ),
        }

        builder.build()
    }

    /// Top-level agent that delegates to the coder and the researcher
    pub fn orchestrator(&self) -> Result<Agent> {
        let tools = ToolRegistry::new()
            .with_agent(self.coder()?, "Delegates a task to the Coder Agent.")
            .with_agent(self.researcher()?, "Delegates a task to the Researcher Agent.");

        Agent::builder("orchestrator")
            .model(self.config.orchestrator_model())
            .system_prompt(ORCHESTRATOR_PROMPT)
            .tools(tools)
            .settings(&self.config.agent)
            .backend(Arc::clone(&self.backend))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::default_schema;
    use crate::llm::ScriptedBackend;

    fn team() -> Team {
        Team::new(Config::default(), Arc::new(ScriptedBackend::new()))
    }

    #[test]
    fn test_orchestrator_tools() {
        let orchestrator = team().orchestrator().unwrap();

        assert_eq!(orchestrator.tools().names(), vec!["ask_coder", "ask_researcher"]);
        assert!(orchestrator.servers().is_empty());
        for definition in orchestrator.tools().definitions() {
            assert_eq!(definition.input_schema, default_schema());
        }
    }

    #[test]
    fn test_coder_has_file_tools() {
        let coder = team().coder().unwrap();
        assert_eq!(coder.tools().names(), vec!["write_file", "read_file"]);
    }

    #[test]
    fn test_researcher_attaches_docs_server() {
        let researcher = team().researcher().unwrap();
        assert!(researcher.tools().is_empty());
        assert_eq!(researcher.servers()[0].name, RESEARCH_SERVER);
        assert_eq!(researcher.servers()[0].command, "uvx");
    }

    #[test]
    fn test_researcher_without_server() {
        let mut config = Config::default();
        config.servers.clear();
        let team = Team::new(config, Arc::new(ScriptedBackend::new()));

        assert!(team.researcher().unwrap().servers().is_empty());
    }
}
