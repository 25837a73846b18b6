//! Current date tool definition.
//!
//! Reports the current wall-clock time at a fixed UTC offset.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use crate::core::config::ToolsConfig;
use crate::domains::tools::{ToolArguments, ToolDescriptor, ToolError, ToolHandler, ToolValue};

/// Output format of the returned timestamp.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current date tool - returns the time at the configured offset.
pub struct GetCurrentDateTool {
    offset: FixedOffset,
}

impl GetCurrentDateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "GetCurrentDate";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get today's date and the current time (YYYY-MM-DD HH:MM:SS).";

    /// Create the tool for a given offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Create the tool from configuration.
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.utc_offset())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Format `now` at this tool's offset.
    pub fn execute(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.offset).format(DATE_FORMAT).to_string()
    }
}

impl ToolHandler for GetCurrentDateTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, Self::DESCRIPTION)
    }

    fn call(&self, _arguments: &ToolArguments) -> Result<ToolValue, ToolError> {
        let formatted = self.execute(Utc::now());
        debug!("Current date at {}: {}", self.offset, formatted);
        Ok(ToolValue::Text(formatted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    fn utc8() -> GetCurrentDateTool {
        GetCurrentDateTool::new(FixedOffset::east_opt(8 * 3600).unwrap())
    }

    #[test]
    fn test_execute_shifts_by_offset() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 20, 30, 15).unwrap();
        assert_eq!(utc8().execute(now), "2025-01-01 04:30:15");
    }

    #[test]
    fn test_call_is_close_to_now() {
        let value = utc8().call(&ToolArguments::default()).unwrap();
        let text = value.as_text().unwrap();

        let parsed = NaiveDateTime::parse_from_str(text, DATE_FORMAT).unwrap();
        let expected = (Utc::now() + chrono::Duration::hours(8)).naive_utc();
        let drift = (expected - parsed).num_seconds().abs();
        assert!(drift <= 5, "drift of {drift}s for {text}");
    }

    #[test]
    fn test_default_config_is_utc_plus_eight() {
        let tool = GetCurrentDateTool::from_config(&ToolsConfig::default());
        assert_eq!(tool.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_descriptor_has_no_parameters() {
        assert!(utc8().descriptor().parameters.is_empty());
    }
}
