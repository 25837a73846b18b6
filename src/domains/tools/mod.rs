//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are named, described, typed callables that MCP clients discover
//! with `tools/list` and invoke with `tools/call`.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `descriptor.rs` - Tool and parameter metadata
//! - `arguments.rs` - Argument validation and type coercion
//! - `handlers.rs` - The `ToolHandler` trait and invocation results
//! - `registry.rs` - Startup-built, read-only tool registry
//! - `dispatch.rs` - Validation and execution of tool calls
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Implement `ToolHandler` (descriptor + call)
//! 3. Export in `definitions/mod.rs`
//! 4. Add it to the list in `ToolRegistry::builtin`
//!
//! Both transports pick it up from the registry.

mod arguments;
pub mod definitions;
mod descriptor;
mod dispatch;
mod error;
mod handlers;
mod registry;

pub use arguments::{ArgumentValue, ToolArguments};
pub use descriptor::{ParameterDescriptor, ParameterType, ToolDescriptor};
pub use dispatch::Dispatcher;
pub use error::ToolError;
pub use handlers::{InvocationRequest, InvocationResult, ToolHandler, ToolValue};
pub use registry::{RegisteredTool, ToolRegistry};
