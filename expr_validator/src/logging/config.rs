//! Logging configuration: runtime preferences within compile-time limits

use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Get runtime preferences (with fallback to defaults)
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Get minimum log level
pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

/// Check if structured logging is enabled
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Validate that the logging configuration can be honoured
pub fn validate_config() -> Result<(), String> {
    LoggingPreferences::from_env_strict().map_err(|e| e.to_string())?;

    if crate::config::compile_time::logging::MAX_LOGGED_EXPRESSION_LENGTH
        > crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH
    {
        return Err("MAX_LOGGED_EXPRESSION_LENGTH exceeds MAX_LOG_MESSAGE_LENGTH".to_string());
    }

    Ok(())
}
