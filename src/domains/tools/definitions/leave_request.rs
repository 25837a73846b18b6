//! Leave request tool definition.
//!
//! Files a leave request and returns a confirmation line. Business-rule
//! rejections (blank mandatory fields) are returned as a normal successful
//! result carrying [`REJECTION_MESSAGE`], not as a tool error.

use tracing::{info, instrument, warn};

use crate::domains::tools::{
    ParameterDescriptor, ParameterType, ToolArguments, ToolDescriptor, ToolError, ToolHandler,
    ToolValue,
};

/// Returned when a mandatory field is blank.
pub const REJECTION_MESSAGE: &str =
    "Leave request failed: please make sure all required fields are filled in.";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the leave request tool.
#[derive(Debug, Clone)]
pub struct LeaveRequestParams {
    /// First day of leave.
    pub start_date: String,

    /// Number of days requested.
    pub days: i64,

    /// Free-text reason. May be blank.
    pub reason: String,

    /// Colleague covering during the leave.
    pub delegate: String,

    /// Person requesting leave.
    pub requester_name: String,
}

impl LeaveRequestParams {
    const START_DATE: &'static str = "startDate";
    const DAYS: &'static str = "days";
    const REASON: &'static str = "reason";
    const DELEGATE: &'static str = "delegate";
    const REQUESTER_NAME: &'static str = "requesterName";

    fn from_arguments(arguments: &ToolArguments) -> Result<Self, ToolError> {
        Ok(Self {
            start_date: arguments.string(Self::START_DATE)?.to_string(),
            days: arguments.integer(Self::DAYS)?,
            reason: arguments.string(Self::REASON)?.to_string(),
            delegate: arguments.string(Self::DELEGATE)?.to_string(),
            requester_name: arguments.string(Self::REQUESTER_NAME)?.to_string(),
        })
    }

    fn missing_mandatory_field(&self) -> Option<&'static str> {
        [
            (Self::START_DATE, &self.start_date),
            (Self::DELEGATE, &self.delegate),
            (Self::REQUESTER_NAME, &self.requester_name),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Leave request tool - files a leave request and reports the outcome.
pub struct LeaveRequestTool;

impl LeaveRequestTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "LeaveRequest";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Submit a leave request and return the result.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(requester = %params.requester_name))]
    pub fn execute(params: &LeaveRequestParams) -> String {
        if let Some(field) = params.missing_mandatory_field() {
            warn!("Leave request rejected: {} is blank", field);
            return REJECTION_MESSAGE.to_string();
        }

        info!(
            "Leave request accepted: {} days from {}",
            params.days, params.start_date
        );

        format!(
            "{} requests {} day(s) of leave starting {}, reason: {}, delegate: {}",
            params.requester_name, params.days, params.start_date, params.reason, params.delegate
        )
    }
}

impl ToolHandler for LeaveRequestTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, Self::DESCRIPTION)
            .with_parameter(ParameterDescriptor::required(
                LeaveRequestParams::START_DATE,
                ParameterType::String,
                "First day of leave",
            ))
            .with_parameter(ParameterDescriptor::required(
                LeaveRequestParams::DAYS,
                ParameterType::Integer,
                "Number of leave days",
            ))
            .with_parameter(ParameterDescriptor::required(
                LeaveRequestParams::REASON,
                ParameterType::String,
                "Reason for the leave",
            ))
            .with_parameter(ParameterDescriptor::required(
                LeaveRequestParams::DELEGATE,
                ParameterType::String,
                "Colleague covering during the leave",
            ))
            .with_parameter(ParameterDescriptor::required(
                LeaveRequestParams::REQUESTER_NAME,
                ParameterType::String,
                "Name of the person requesting leave",
            ))
    }

    fn call(&self, arguments: &ToolArguments) -> Result<ToolValue, ToolError> {
        let params = LeaveRequestParams::from_arguments(arguments)?;
        Ok(ToolValue::Text(Self::execute(&params)))
    }
}

// ============================================================================
// Tests
// ============================================================================
