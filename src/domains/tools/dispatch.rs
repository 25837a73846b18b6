//! Tool dispatch - validates and executes tool invocations.
//!
//! Every transport funnels `tools/list` and `tools/call` through the
//! [`Dispatcher`], so argument validation and error mapping behave the same
//! regardless of how the request arrived.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::arguments::ToolArguments;
use super::descriptor::ToolDescriptor;
use super::error::ToolError;
use super::handlers::{InvocationRequest, InvocationResult, ToolValue};
use super::registry::ToolRegistry;

/// Resolves, validates and invokes tools from a read-only registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// All tool descriptors, in registration order.
    pub fn list_tools(&self) -> Vec<&ToolDescriptor> {
        self.registry.list_all()
    }

    /// Execute a single invocation request.
    pub fn dispatch(&self, request: &InvocationRequest) -> InvocationResult {
        self.call_tool(&request.tool_name, &request.arguments)
    }

    /// Invoke `name` with raw JSON arguments.
    ///
    /// Never fails: unknown tools, bad arguments and faults raised by the
    /// tool itself all come back as [`InvocationResult::Failure`].
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> InvocationResult {
        let result = self.try_call(name, arguments);
        match &result {
            Ok(_) => info!("Tool {} completed", name),
            Err(e) => warn!("Tool {} failed: {}", name, e),
        }
        result.into()
    }

    fn try_call(&self, name: &str, arguments: &Map<String, Value>) -> Result<ToolValue, ToolError> {
        let tool = self.registry.lookup(name)?;
        let arguments = ToolArguments::validate(tool.descriptor(), arguments)?;
        let handler = tool.handler();

        match catch_unwind(AssertUnwindSafe(|| handler.call(&arguments))) {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "tool panicked".to_string());
                Err(ToolError::execution_failed(detail))
            }
        }
    }
}
