// RUNTIME PREFERENCES (observability only, never validation semantics)

use serde::{Deserialize, Serialize};
use std::env;

/// Preference validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {variable}: '{value}'")]
    InvalidValue { variable: String, value: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::INVALID_PREFERENCE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPreferences {
    /// Whether to log per-stage outcomes at debug level
    pub log_stage_details: bool,

    /// Whether the expression text itself may appear in log context
    pub log_expression_text: bool,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        Self {
            log_stage_details: env_flag(env_vars::VALIDATION_LOG_STAGE_DETAILS, false),
            log_expression_text: env_flag(env_vars::VALIDATION_LOG_EXPRESSION_TEXT, false),
        }
    }
}

impl ValidationPreferences {
    /// Preferences with every logging switch turned off
    pub fn quiet() -> Self {
        Self {
            log_stage_details: false,
            log_expression_text: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

impl LoggingPreferences {
    /// Read preferences from the environment, rejecting malformed values
    /// instead of silently falling back to defaults.
    pub fn from_env_strict() -> Result<Self, ConfigError> {
        let use_structured_logging = match env::var(env_vars::LOGGING_USE_STRUCTURED) {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                variable: env_vars::LOGGING_USE_STRUCTURED.to_string(),
                value: raw.clone(),
            })?,
            Err(_) => false,
        };

        let min_log_level = match env::var(env_vars::LOGGING_MIN_LEVEL) {
            Ok(raw) => parse_log_level(&raw).ok_or_else(|| ConfigError::InvalidValue {
                variable: env_vars::LOGGING_MIN_LEVEL.to_string(),
                value: raw.clone(),
            })?,
            Err(_) => LogLevel::Warning,
        };

        Ok(Self {
            use_structured_logging,
            min_log_level,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

fn env_flag(variable: &str, default: bool) -> bool {
    env::var(variable)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub validation: ValidationPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Validation
    pub const VALIDATION_LOG_STAGE_DETAILS: &str = "EXPR_VALIDATION_LOG_STAGE_DETAILS";
    pub const VALIDATION_LOG_EXPRESSION_TEXT: &str = "EXPR_VALIDATION_LOG_EXPRESSION_TEXT";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "EXPR_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "EXPR_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert_eq!(
            LogLevel::Info.to_events_log_level(),
            crate::logging::LogLevel::Info
        );
    }

    #[test]
    fn test_quiet_preferences() {
        let prefs = ValidationPreferences::quiet();
        assert!(!prefs.log_stage_details);
        assert!(!prefs.log_expression_text);
    }

    #[test]
    fn test_env_var_names_are_prefixed() {
        for name in [
            env_vars::VALIDATION_LOG_STAGE_DETAILS,
            env_vars::VALIDATION_LOG_EXPRESSION_TEXT,
            env_vars::LOGGING_USE_STRUCTURED,
            env_vars::LOGGING_MIN_LEVEL,
        ] {
            assert!(name.starts_with("EXPR_"));
        }
    }
}
