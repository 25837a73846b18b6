//! Leave Tools MCP Server Library
//!
//! A small Model Context Protocol (MCP) server that registers a fixed set of
//! tools at startup and serves them over HTTP (Server-Sent Events plus
//! JSON-RPC over POST) or stdio.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool descriptors, the registry, dispatch and the built-in tools
//!
//! # Example
//!
//! ```rust,no_run
//! use leave_tools_mcp::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, McpServer, Result};
