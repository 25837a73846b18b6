//! Argument validation and coercion.
//!
//! Raw JSON arguments from a `tools/call` request are checked against the
//! tool's [`ToolDescriptor`] and converted into [`ToolArguments`] before the
//! tool callable ever sees them.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::descriptor::{ParameterDescriptor, ParameterType, ToolDescriptor};
use super::error::ToolError;

/// A single argument value after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Integer(i64),
    String(String),
    Boolean(bool),
    Float(f64),
}

/// Validated arguments, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    values: HashMap<String, ArgumentValue>,
}

impl ToolArguments {
    /// Validate `raw` against `descriptor`.
    ///
    /// Every required parameter must be present and non-null, and each value
    /// must be convertible to the declared type. Keys the descriptor does not
    /// declare are ignored.
    pub fn validate(
        descriptor: &ToolDescriptor,
        raw: &Map<String, Value>,
    ) -> Result<Self, ToolError> {
        let mut values = HashMap::with_capacity(descriptor.parameters.len());

        for param in &descriptor.parameters {
            match raw.get(&param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ToolError::missing_argument(&param.name));
                    }
                }
                Some(value) => {
                    values.insert(param.name.clone(), coerce(param, value)?);
                }
            }
        }

        for key in raw.keys() {
            if descriptor.parameter(key).is_none() {
                debug!("Ignoring undeclared argument '{}' for tool {}", key, descriptor.name);
            }
        }

        Ok(Self { values })
    }

    /// Raw access to a coerced value.
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    /// Get a string argument.
    pub fn string(&self, name: &str) -> Result<&str, ToolError> {
        match self.values.get(name) {
            Some(ArgumentValue::String(s)) => Ok(s),
            Some(_) => Err(ToolError::invalid_argument(name, "expected string")),
            None => Err(ToolError::missing_argument(name)),
        }
    }

    /// Get an integer argument.
    pub fn integer(&self, name: &str) -> Result<i64, ToolError> {
        match self.values.get(name) {
            Some(ArgumentValue::Integer(n)) => Ok(*n),
            Some(_) => Err(ToolError::invalid_argument(name, "expected integer")),
            None => Err(ToolError::missing_argument(name)),
        }
    }

    /// Get a boolean argument.
    pub fn boolean(&self, name: &str) -> Result<bool, ToolError> {
        match self.values.get(name) {
            Some(ArgumentValue::Boolean(b)) => Ok(*b),
            Some(_) => Err(ToolError::invalid_argument(name, "expected boolean")),
            None => Err(ToolError::missing_argument(name)),
        }
    }

    /// Get a float argument.
    pub fn float(&self, name: &str) -> Result<f64, ToolError> {
        match self.values.get(name) {
            Some(ArgumentValue::Float(x)) => Ok(*x),
            Some(_) => Err(ToolError::invalid_argument(name, "expected float")),
            None => Err(ToolError::missing_argument(name)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn coerce(param: &ParameterDescriptor, value: &Value) -> Result<ArgumentValue, ToolError> {
    let mismatch = || {
        ToolError::invalid_argument(
            &param.name,
            format!("expected {}, got {}", param.param_type, json_type_name(value)),
        )
    };

    match param.param_type {
        ParameterType::String => value
            .as_str()
            .map(|s| ArgumentValue::String(s.to_string()))
            .ok_or_else(mismatch),
        ParameterType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(ArgumentValue::Integer)
                .ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(ArgumentValue::Integer)
                .map_err(|_| {
                    ToolError::invalid_argument(&param.name, format!("'{}' is not an integer", s))
                }),
            _ => Err(mismatch()),
        },
        ParameterType::Float => match value {
            Value::Number(n) => n.as_f64().map(ArgumentValue::Float).ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ArgumentValue::Float)
                .ok_or_else(|| {
                    ToolError::invalid_argument(&param.name, format!("'{}' is not a number", s))
                }),
            _ => Err(mismatch()),
        },
        ParameterType::Boolean => match value {
            Value::Bool(b) => Ok(ArgumentValue::Boolean(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(ArgumentValue::Boolean(true)),
                "false" => Ok(ArgumentValue::Boolean(false)),
                _ => Err(ToolError::invalid_argument(
                    &param.name,
                    format!("'{}' is not a boolean", s),
                )),
            },
            _ => Err(mismatch()),
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
