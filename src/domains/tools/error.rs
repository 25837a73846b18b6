//! Tool-specific error types.

use thiserror::Error;

/// Errors that can occur during tool registration or invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A required argument was absent or null.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// An argument was present but could not be used.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// The tool callable itself failed.
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),

    /// A tool with the same name has already been registered.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),

    /// A descriptor is malformed (e.g. repeats a parameter name).
    #[error("invalid descriptor for tool '{tool}': {reason}")]
    InvalidDescriptor { tool: String, reason: String },
}

impl ToolError {
    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new "missing argument" error.
    pub fn missing_argument(field: impl Into<String>) -> Self {
        Self::MissingArgument(field.into())
    }

    /// Create a new "invalid argument" error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Whether this error can only happen while the registry is being built.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Self::DuplicateTool(_) | Self::InvalidDescriptor { .. })
    }
}
