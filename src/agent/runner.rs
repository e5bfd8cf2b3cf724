//! Conversation loop - drives rounds between the backend and the tools
//!
//! Each round sends the full history with the merged tool definitions. A
//! reply without tool requests ends the loop; otherwise every requested
//! tool runs in order and the results go back as one user message.

use crate::agent::conversation::Conversation;
use crate::agent::loop_state::{LoopState, Step};
use crate::agent::Agent;
use crate::core::{BatonError, Message, Result};
use crate::llm::ConverseRequest;
use crate::tools::ToolDispatcher;

/// Structured outcome of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Final answer text
    pub text: String,
    /// Complete message history, prompt first
    pub messages: Vec<Message>,
    /// Backend rounds used
    pub rounds: usize,
}

/// One agent's loop over a fixed tool namespace
pub struct ConversationLoop<'a> {
    agent: &'a Agent,
    tools: ToolDispatcher<'a>,
}

impl<'a> ConversationLoop<'a> {
    pub fn new(agent: &'a Agent, tools: ToolDispatcher<'a>) -> Self {
        Self { agent, tools }
    }

    /// Run the loop to a final answer
    pub async fn run(&self, prompt: &str) -> Result<Invocation> {
        let mut conversation = Conversation::new(prompt);
        let mut state = LoopState::new(self.agent.max_rounds());
        let definitions = self.tools.definitions();

        loop {
            let request = ConverseRequest::new(
                self.agent.model_id(),
                conversation.messages().to_vec(),
                self.agent.system_prompt(),
                self.agent.temperature(),
                definitions.clone(),
            );

            tracing::debug!(
                agent = %self.agent.name(),
                round = state.round + 1,
                messages = conversation.len(),
                tools = definitions.len(),
                "Sending request"
            );

            let response = self
                .agent
                .backend()
                .converse(&request)
                .await
                .map_err(BatonError::into_backend)?;
            state.next_round();

            if let Some(usage) = &response.usage {
                tracing::debug!(
                    input = usage.input_tokens,
                    output = usage.output_tokens,
                    "Token usage"
                );
            }

            let reply = response.output.message;
            let step = Step::from_reply(&reply);
            conversation.add_assistant(reply);

            match step {
                Step::Finish(text) => {
                    return Ok(Invocation {
                        text,
                        messages: conversation.into_messages(),
                        rounds: state.round,
                    });
                }
                Step::Execute(tool_uses) => {
                    if state.exhausted() {
                        return Err(BatonError::RoundLimit(state.max_rounds));
                    }

                    // One at a time; results keep request order
                    let mut results = Vec::with_capacity(tool_uses.len());
                    for tool_use in &tool_uses {
                        results.push(self.tools.execute(tool_use).await);
                    }
                    conversation.add_tool_results(results);
                }
            }
        }
    }
}
