//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler. It owns the tool
//! [`Dispatcher`] and exposes it in two shapes:
//! - rmcp's [`ServerHandler`] trait, used by the stdio transport
//! - plain JSON helpers, used by the HTTP transport
//!
//! Tools are defined in `domains/tools/definitions/` and registered in
//! `ToolRegistry::builtin`. **Adding a new tool does NOT require modifying
//! this file!**

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::error::Result;
use crate::domains::tools::{Dispatcher, InvocationRequest, InvocationResult, ToolRegistry};

/// The main MCP server handler.
///
/// Cheap to clone; every clone shares the same read-only registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Dispatcher over the startup-built tool registry.
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server with the built-in tools.
    ///
    /// Fails if the registry cannot be built (e.g. duplicate tool names).
    pub fn new(config: Config) -> Result<Self> {
        let registry = ToolRegistry::builtin(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server over an explicitly built registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Dispatcher::new(Arc::new(registry)),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Instructions reported on initialize.
    pub fn instructions(&self) -> &str {
        &self.config.server.instructions
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools as MCP JSON (for HTTP transport).
    pub fn list_tools(&self) -> Vec<Value> {
        self.dispatcher
            .list_tools()
            .into_iter()
            .map(|t| t.to_mcp_json())
            .collect()
    }

    /// Call a tool by name and render the MCP result (for HTTP transport).
    pub fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> Value {
        self.invoke(name, arguments).to_mcp_json()
    }

    /// Call a tool by name and return the logical result.
    pub fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> InvocationResult {
        self.dispatcher.call_tool(name, arguments)
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions().to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("Listing tools");
        let tools = self
            .dispatcher
            .list_tools()
            .into_iter()
            .map(|t| t.to_tool())
            .collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        let invocation =
            InvocationRequest::new(request.name.clone(), request.arguments.unwrap_or_default());
        Ok(self.dispatcher.dispatch(&invocation).to_call_tool_result())
    }
}
