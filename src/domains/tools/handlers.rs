//! Tool handler trait and invocation result types.
//!
//! Every tool in `definitions/` implements [`ToolHandler`]. The dispatcher
//! validates arguments before calling [`ToolHandler::call`] and wraps the
//! outcome in an [`InvocationResult`].

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::arguments::ToolArguments;
use super::descriptor::ToolDescriptor;
use super::error::ToolError;

/// A single tool invocation, created per inbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Name of the tool to call.
    #[serde(rename = "name")]
    pub tool_name: String,

    /// Raw arguments, keyed by parameter name.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Value returned by a successful tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolValue {
    Integer(i64),
    Text(String),
}

impl ToolValue {
    /// Text rendering sent as MCP text content.
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }
}

impl From<i64> for ToolValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for ToolValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ToolValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Outcome of a single `call_tool` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationResult {
    Success { value: ToolValue },
    #[serde(rename = "error")]
    Failure { message: String },
}

impl InvocationResult {
    /// Create a successful result.
    pub fn success(value: impl Into<ToolValue>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    /// Create a failed result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The success value, if any.
    pub fn value(&self) -> Option<&ToolValue> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failure { message } => Some(message),
            Self::Success { .. } => None,
        }
    }

    /// Convert to the rmcp result model (stdio transport).
    pub fn to_call_tool_result(&self) -> CallToolResult {
        let mut result = match self {
            Self::Success { value } => CallToolResult::success(vec![Content::text(value.to_text())]),
            Self::Failure { message } => CallToolResult::error(vec![Content::text(message.clone())]),
        };
        result.structured_content = serde_json::to_value(self).ok();
        result
    }

    /// MCP `tools/call` result body for the HTTP transport.
    ///
    /// Carries the text content, the `isError` flag and the logical
    /// `{status, value|message}` envelope as `structuredContent`.
    pub fn to_mcp_json(&self) -> Value {
        let (text, is_error) = match self {
            Self::Success { value } => (value.to_text(), false),
            Self::Failure { message } => (message.clone(), true),
        };

        json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
            "structuredContent": self,
        })
    }
}

impl From<Result<ToolValue, ToolError>> for InvocationResult {
    fn from(result: Result<ToolValue, ToolError>) -> Self {
        match result {
            Ok(value) => Self::Success { value },
            Err(e) => Self::Failure {
                message: e.to_string(),
            },
        }
    }
}

/// A named, described, typed callable.
///
/// Implementations must be cheap and non-blocking; they run synchronously
/// on the request task.
pub trait ToolHandler: Send + Sync {
    /// Metadata describing this tool. Must list every argument `call` reads.
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with already validated arguments.
    fn call(&self, arguments: &ToolArguments) -> Result<ToolValue, ToolError>;
}
