//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod current_date;
pub mod leave_record;
pub mod leave_request;

pub use current_date::GetCurrentDateTool;
pub use leave_record::GetLeaveRecordAmountTool;
pub use leave_request::LeaveRequestTool;
