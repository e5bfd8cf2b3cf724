//! CLI commands
//!
//! Special words recognised by the REPL before a line goes to the agent.

use crate::agent::Agent;

/// Result of parsing a line
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Send the line to the agent
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Blank line
    None,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, agent: &Agent) -> CommandResult {
    let input = input.trim();

    match input.to_lowercase().as_str() {
        "" => CommandResult::None,
        "exit" | "quit" => CommandResult::Exit,
        "help" | "?" => CommandResult::Handled(help_text()),
        "status" => CommandResult::Handled(status_text(agent)),
        _ => CommandResult::Continue(input.to_string()),
    }
}

fn help_text() -> String {
    "Commands:\n  \
     help      Show this help\n  \
     status    Show the agent's model, tools and servers\n  \
     exit      Quit (also: quit, Ctrl+D)\n\n\
     Anything else is sent to the orchestrator."
        .to_string()
}

fn status_text(agent: &Agent) -> String {
    let servers: Vec<&str> = agent.servers().iter().map(|s| s.name.as_str()).collect();

    format!(
        "Agent:      {}\n\
         Model:      {}\n\
         Backend:    {}\n\
         Tools:      {}\n\
         Servers:    {}\n\
         Max rounds: {}",
        agent.name(),
        agent.model_id(),
        agent.backend().name(),
        agent.tools().names().join(", "),
        if servers.is_empty() {
            "none".to_string()
        } else {
            servers.join(", ")
        },
        agent.max_rounds()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedBackend;
    use std::sync::Arc;

    fn agent() -> Agent {
        Agent::builder("orchestrator")
            .model("qwen3:8b")
            .backend(Arc::new(ScriptedBackend::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_exit_words() {
        assert_eq!(handle_command("exit", &agent()), CommandResult::Exit);
        assert_eq!(handle_command("  QUIT ", &agent()), CommandResult::Exit);
    }

    #[test]
    fn test_prompt_passes_through_trimmed() {
        assert_eq!(
            handle_command("  list my buckets \n", &agent()),
            CommandResult::Continue("list my buckets".into())
        );
        assert_eq!(handle_command("   ", &agent()), CommandResult::None);
    }

    #[test]
    fn test_status_names_model() {
        let CommandResult::Handled(text) = handle_command("status", &agent()) else {
            panic!("status should be handled");
        };
        assert!(text.contains("qwen3:8b"));
        assert!(text.contains("Servers:    none"));
    }
}
