//! Tools module - native tools, remote tool servers, and dispatch
//!
//! Contains the native tool registry, the per-invocation remote connector,
//! the dispatcher that merges both, and agent delegation.

pub mod delegate;
pub mod dispatcher;
pub mod files;
pub mod registry;
pub mod remote;

pub use delegate::Delegate;
pub use dispatcher::ToolDispatcher;
pub use registry::{FnTool, NativeTool, ToolArgs, ToolHandler, ToolRegistry};
pub use remote::{
    McpSession, McpSessionFactory, RemoteCallResult, RemoteContent, RemoteHandle, RemoteSession,
    RemoteToolConnector, ServerDescriptor, SessionFactory,
};
