//! Leave record lookup tool definition.
//!
//! Returns the number of leave days on record for an employee. The figures
//! come from a fixed in-memory table.

use tracing::{info, instrument};

use crate::domains::tools::{
    ParameterDescriptor, ParameterType, ToolArguments, ToolDescriptor, ToolError, ToolHandler,
    ToolValue,
};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the leave record lookup tool.
#[derive(Debug, Clone)]
pub struct LeaveRecordParams {
    /// Employee whose leave days are looked up.
    pub employee_name: String,
}

impl LeaveRecordParams {
    const EMPLOYEE_NAME: &'static str = "employeeName";

    fn from_arguments(arguments: &ToolArguments) -> Result<Self, ToolError> {
        let employee_name = arguments.string(Self::EMPLOYEE_NAME)?;
        if employee_name.is_empty() {
            return Err(ToolError::invalid_argument(
                Self::EMPLOYEE_NAME,
                "must not be empty",
            ));
        }

        Ok(Self {
            employee_name: employee_name.to_string(),
        })
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Leave record tool - looks up how many leave days an employee has taken.
pub struct GetLeaveRecordAmountTool;

impl GetLeaveRecordAmountTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "GetLeaveRecordAmount";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get the number of leave days on record for an employee.";

    /// Days returned for employees missing from the table.
    pub const DEFAULT_DAYS: i64 = 3;

    /// Execute the tool logic.
    #[instrument(skip_all, fields(employee = %params.employee_name))]
    pub fn execute(params: &LeaveRecordParams) -> i64 {
        let days = match params.employee_name.to_lowercase().as_str() {
            "david" => 5,
            "eric" => 6,
            _ => Self::DEFAULT_DAYS,
        };
        info!("Leave record for {}: {} days", params.employee_name, days);
        days
    }
}

impl ToolHandler for GetLeaveRecordAmountTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, Self::DESCRIPTION).with_parameter(
            ParameterDescriptor::required(
                LeaveRecordParams::EMPLOYEE_NAME,
                ParameterType::String,
                "Name of the employee whose leave days should be looked up",
            ),
        )
    }

    fn call(&self, arguments: &ToolArguments) -> Result<ToolValue, ToolError> {
        let params = LeaveRecordParams::from_arguments(arguments)?;
        Ok(ToolValue::Integer(Self::execute(&params)))
    }
}

// ============================================================================
// Tests
// ============================================================================
