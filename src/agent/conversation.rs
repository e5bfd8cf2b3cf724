//! Conversation history for a single invocation
//!
//! Append-only: messages are pushed after every backend reply and every
//! tool batch, and the whole history is sent each round.

use crate::core::{Message, ToolResult};

/// Ordered message history owned by one invocation
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with the user's prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
        }
    }

    /// Append an assistant reply
    pub fn add_assistant(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append one user message carrying a round's tool results
    pub fn add_tool_results(&mut self, results: Vec<ToolResult>) {
        self.messages.push(Message::tool_results(results));
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Give up the history
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;

    #[test]
    fn test_conversation_basic() {
        let mut conv = Conversation::new("Hello");
        conv.add_assistant(Message::assistant_text("Hi there!"));

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].role, Role::User);
        assert_eq!(conv.last().unwrap().text(), "Hi there!");
    }

    #[test]
    fn test_tool_results_form_one_user_message() {
        let mut conv = Conversation::new("check");
        conv.add_tool_results(vec![
            ToolResult::success("a", "1"),
            ToolResult::success("b", "2"),
        ]);

        let last = conv.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.results().len(), 2);
    }
}
