//! Agent module - personas and the tool-use conversation loop
//!
//! An agent sends its history to the backend, executes whatever tools the
//! reply requests, and repeats until the reply is plain text.

pub mod conversation;
pub mod loop_state;
pub mod persona;
pub mod runner;

pub use conversation::Conversation;
pub use loop_state::{LoopState, Step};
pub use persona::{Agent, AgentBuilder, AgentSettings};
pub use runner::{ConversationLoop, Invocation};
