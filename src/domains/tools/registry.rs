//! Tool Registry - central registration and lookup for all tools.
//!
//! This module provides:
//! - A registry of all available tools, in registration order
//! - Lookup of a tool's descriptor and callable by name
//! - The static list of built-in tools
//!
//! The registry is populated once at startup and is read-only afterwards,
//! so it can be shared across connections behind an `Arc` without locking.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::config::Config;

use super::definitions::{GetCurrentDateTool, GetLeaveRecordAmountTool, LeaveRequestTool};
use super::descriptor::ToolDescriptor;
use super::error::ToolError;
use super::handlers::ToolHandler;

// ============================================================================
// Registered Tool
// ============================================================================

/// A descriptor paired with the callable it describes.
#[derive(Clone)]
pub struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.descriptor.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry of built-in tools.
    ///
    /// This is the single source of truth for all available tools. Either
    /// every tool registers or an error is returned.
    pub fn builtin(config: &Config) -> Result<Self, ToolError> {
        let mut registry = Self::new();

        let handlers: Vec<Arc<dyn ToolHandler>> = vec![
            Arc::new(GetLeaveRecordAmountTool),
            Arc::new(LeaveRequestTool),
            Arc::new(GetCurrentDateTool::from_config(&config.tools)),
        ];

        for handler in handlers {
            registry.register(handler.descriptor(), handler)?;
        }

        info!("Registered {} tools", registry.len());
        Ok(registry)
    }

    /// Register a tool under `descriptor.name`.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), ToolError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateTool(descriptor.name));
        }

        let mut seen = HashSet::new();
        for param in &descriptor.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(ToolError::InvalidDescriptor {
                    tool: descriptor.name.clone(),
                    reason: format!("parameter '{}' declared twice", param.name),
                });
            }
        }

        debug!(
            "Registering tool {} ({} parameters)",
            descriptor.name,
            descriptor.parameters.len()
        );

        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Look up a tool by exact name.
    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    /// All descriptors, in registration order.
    pub fn list_all(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor).collect()
    }

    /// All tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.descriptor.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::arguments::ToolArguments;
    use crate::domains::tools::descriptor::{ParameterDescriptor, ParameterType};
    use crate::domains::tools::handlers::ToolValue;

    struct Constant(&'static str);

    impl ToolHandler for Constant {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(self.0, "Returns a constant")
        }

        fn call(&self, _arguments: &ToolArguments) -> Result<ToolValue, ToolError> {
            Ok(ToolValue::Integer(1))
        }
    }

    fn builtin() -> ToolRegistry {
        ToolRegistry::builtin(&Config::default()).unwrap()
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = builtin();
        assert_eq!(
            registry.tool_names(),
            vec!["GetLeaveRecordAmount", "LeaveRequest", "GetCurrentDate"]
        );
    }

    #[test]
    fn test_lookup_returns_matching_descriptor() {
        let registry = builtin();
        for name in registry.tool_names() {
            let tool = registry.lookup(name).unwrap();
            assert_eq!(tool.descriptor().name, name);
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = builtin();
        let err = registry.lookup("DeleteEverything").unwrap_err();
        assert_eq!(err, ToolError::unknown_tool("DeleteEverything"));
        // Names are matched exactly.
        assert!(registry.lookup("leaverequest").is_err());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ToolRegistry::new();
        let tool = Arc::new(Constant("Once"));
        registry.register(tool.descriptor(), tool.clone()).unwrap();

        let err = registry.register(tool.descriptor(), tool).unwrap_err();
        assert_eq!(err, ToolError::DuplicateTool("Once".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_repeated_parameter_rejected() {
        let mut registry = ToolRegistry::new();
        let param = ParameterDescriptor::required("x", ParameterType::String, "x");
        let descriptor = ToolDescriptor::new("Twice", "d")
            .with_parameter(param.clone())
            .with_parameter(param);

        let err = registry
            .register(descriptor, Arc::new(Constant("Twice")))
            .unwrap_err();
        assert!(err.is_registration_error());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_all_is_order_stable() {
        let mut registry = ToolRegistry::new();
        for name in ["B", "A", "C"] {
            let tool = Arc::new(Constant(name));
            registry.register(tool.descriptor(), tool).unwrap();
        }

        let first: Vec<_> = registry.list_all().iter().map(|d| d.name.clone()).collect();
        let second: Vec<_> = registry.list_all().iter().map(|d| d.name.clone()).collect();
        assert_eq!(first, vec!["B", "A", "C"]);
        assert_eq!(first, second);
    }
}
