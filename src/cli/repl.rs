//! Interactive REPL for Baton
//!
//! Reads prompts line by line and prints the orchestrator's answers.

use std::io::{self, BufRead, Write};

use crate::agent::Agent;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::Result;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
}

impl Repl {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// Run against the terminal
    pub async fn run(&self) -> Result<()> {
        self.print_banner();
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout()).await
    }

    /// Run against any line source and sink
    pub async fn run_with<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<()> {
        loop {
            write!(output, "You: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF (Ctrl+D)
                writeln!(output, "\nGoodbye!")?;
                break;
            }

            match handle_command(&line, &self.agent) {
                CommandResult::Exit => {
                    writeln!(output, "Goodbye!")?;
                    break;
                }
                CommandResult::Handled(text) => writeln!(output, "{}\n", text)?,
                CommandResult::None => continue,
                CommandResult::Continue(prompt) => {
                    let answer = self.agent.invoke(&prompt).await;
                    writeln!(output, "\nAssistant:\n{}\n", answer)?;
                }
            }
        }

        Ok(())
    }

    fn print_banner(&self) {
        println!("Baton - multi-agent assistant");
        println!(
            "Orchestrator: {} ({})",
            self.agent.model_id(),
            self.agent.backend().name()
        );
        println!("Commands: help, status, exit");
        println!("{}", "-".repeat(40));
    }
}
