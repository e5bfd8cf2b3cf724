//! Conversation loop state
//!
//! Tracks rounds against the cap and classifies each backend reply as
//! either a final answer or a batch of tool requests.

use crate::core::{Message, ToolUse};

/// What the loop does after a backend reply
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// No tool requests: the joined text is the answer
    Finish(String),
    /// Run these tools, in order, then ask again
    Execute(Vec<ToolUse>),
}

impl Step {
    /// Classify an assistant message
    pub fn from_reply(message: &Message) -> Self {
        let tool_uses = message.tool_uses();
        if tool_uses.is_empty() {
            Self::Finish(message.text())
        } else {
            Self::Execute(tool_uses.into_iter().cloned().collect())
        }
    }
}

/// Round counter for one invocation
#[derive(Debug, Clone, Copy)]
pub struct LoopState {
    /// Backend rounds completed so far
    pub round: usize,
    /// Maximum allowed rounds
    pub max_rounds: usize,
}

impl LoopState {
    /// Create a new loop state with the given cap (at least one round)
    pub fn new(max_rounds: usize) -> Self {
        Self {
            round: 0,
            max_rounds: max_rounds.max(1),
        }
    }

    /// Record a completed backend round
    pub fn next_round(&mut self) {
        self.round += 1;
    }

    /// Whether the cap forbids another backend round
    pub fn exhausted(&self) -> bool {
        self.round >= self.max_rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContentBlock;
    use serde_json::json;

    #[test]
    fn test_text_only_reply_finishes() {
        let reply = Message::assistant(vec![
            ContentBlock::Text("part one".into()),
            ContentBlock::Text("part two".into()),
        ]);
        assert_eq!(Step::from_reply(&reply), Step::Finish("part one\npart two".into()));
    }

    #[test]
    fn test_tool_uses_keep_order() {
        let reply = Message::assistant(vec![
            ContentBlock::Text("let me check".into()),
            ContentBlock::ToolUse(ToolUse::new("a", "first", json!({}))),
            ContentBlock::ToolUse(ToolUse::new("b", "second", json!({}))),
        ]);

        let Step::Execute(uses) = Step::from_reply(&reply) else {
            panic!("expected tool execution");
        };
        let ids: Vec<&str> = uses.iter().map(|u| u.tool_use_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_reply_finishes_with_empty_text() {
        assert_eq!(
            Step::from_reply(&Message::assistant(vec![])),
            Step::Finish(String::new())
        );
    }

    #[test]
    fn test_round_cap() {
        let mut state = LoopState::new(2);
        assert!(!state.exhausted());
        state.next_round();
        state.next_round();
        assert!(state.exhausted());

        assert_eq!(LoopState::new(0).max_rounds, 1);
    }
}
