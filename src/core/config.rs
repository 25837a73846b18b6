//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults.

use super::transport::TransportConfig;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Built-in tool settings.
    pub tools: ToolsConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Instructions sent to clients on initialize.
    pub instructions: String,
}

/// Settings for the built-in tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Offset from UTC, in hours, used by `GetCurrentDate`.
    pub utc_offset_hours: i32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl ToolsConfig {
    pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

    /// The configured offset, falling back to the default when out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        Self::offset_for(self.utc_offset_hours)
            .or_else(|| Self::offset_for(Self::DEFAULT_UTC_OFFSET_HOURS))
            .unwrap_or_else(|| Utc.fix())
    }

    fn offset_for(hours: i32) -> Option<FixedOffset> {
        if !(-23..=23).contains(&hours) {
            return None;
        }
        FixedOffset::east_opt(hours * 3600)
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: Self::DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "leave-tools-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instructions: "Leave management tools: look up leave balances, file leave \
                               requests and get the current date."
                    .to_string(),
            },
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Load only the logging settings, ahead of [`Config::from_env`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut logging = Self::default();
        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }
        logging
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`.
    pub fn from_env() -> Self {
        let mut config = Self {
            logging: LoggingConfig::from_env(),
            ..Self::default()
        };

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(offset) = std::env::var("MCP_CLOCK_UTC_OFFSET_HOURS") {
            match offset.trim().parse::<i32>() {
                Ok(hours) if (-23..=23).contains(&hours) => {
                    config.tools.utc_offset_hours = hours;
                    info!("Clock offset set to UTC{:+}", hours);
                }
                _ => warn!(
                    "Invalid MCP_CLOCK_UTC_OFFSET_HOURS '{}', using UTC{:+}",
                    offset,
                    ToolsConfig::DEFAULT_UTC_OFFSET_HOURS
                ),
            }
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_clock_offset_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_CLOCK_UTC_OFFSET_HOURS", "-5");
        }
        let config = Config::from_env();
        assert_eq!(config.tools.utc_offset_hours, -5);
        assert_eq!(config.tools.utc_offset().local_minus_utc(), -5 * 3600);
        unsafe {
            std::env::remove_var("MCP_CLOCK_UTC_OFFSET_HOURS");
        }
    }

    #[test]
    fn test_invalid_clock_offset_falls_back() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_CLOCK_UTC_OFFSET_HOURS", "forty");
        }
        let config = Config::from_env();
        assert_eq!(config.tools.utc_offset_hours, 8);
        unsafe {
            std::env::remove_var("MCP_CLOCK_UTC_OFFSET_HOURS");
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_clock_offset_is_logged() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_CLOCK_UTC_OFFSET_HOURS", "forty");
        }

        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, Config::from_env);

        unsafe {
            std::env::remove_var("MCP_CLOCK_UTC_OFFSET_HOURS");
        }
        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("Invalid MCP_CLOCK_UTC_OFFSET_HOURS 'forty'"), "{output}");
    }

    #[test]
    fn test_log_level_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_LOG_LEVEL", "debug");
        }
        assert_eq!(LoggingConfig::from_env().level, "debug");
        assert_eq!(Config::from_env().logging.level, "debug");
        unsafe {
            std::env::remove_var("MCP_LOG_LEVEL");
        }
    }

    #[test]
    fn test_out_of_range_offset_uses_default() {
        let tools = ToolsConfig {
            utc_offset_hours: 99,
        };
        assert_eq!(tools.utc_offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_server_name_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_SERVER_NAME", "leave-test");
        }
        let config = Config::from_env();
        assert_eq!(config.server.name, "leave-test");
        unsafe {
            std::env::remove_var("MCP_SERVER_NAME");
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.server.name, "leave-tools-mcp");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.tools.utc_offset_hours, 8);
    }
}
