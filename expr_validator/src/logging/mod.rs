//! Global logging module for the expression validator
//!
//! Provides thread-safe global logging with per-thread source context
//! (file and line of the expression being validated) and a clean macro
//! interface. Logging is inert until `init_global_logging` is called.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
}

/// Where the expression currently being validated came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub source: PathBuf,
    pub line: usize,
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system from runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let preferences = crate::config::LoggingPreferences::from_env_strict()
        .map_err(|e| format!("Invalid logging preferences: {}", e))?;
    // Preferences may already be set by an embedding application
    let _ = config::init_runtime_preferences(preferences);

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    // Every stage code must carry metadata before anything is logged
    let required = [
        codes::braces::UNKNOWN_CUSTOM_TOKEN,
        codes::functions::UNAUTHORIZED_FUNCTION,
        codes::syntax::INVALID_CHARACTERS,
        codes::system::INTERNAL_ERROR,
    ];
    for code in required {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for code: {}", code));
        }
    }

    logging_service.log_event(
        LogEvent::success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Global logging system initialized",
        )
        .with_context("config", &crate::config::build_info::source_info()),
    );

    Ok(())
}

/// Initialize with custom service (primarily for testing and embedding)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether events at `level` would reach the logger
pub fn level_enabled(level: LogLevel) -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(level))
        .unwrap_or(false)
}

/// Whether debug events would reach the logger (used by log_debug!)
pub fn debug_enabled() -> bool {
    level_enabled(LogLevel::Debug)
}

// ============================================================================
// SOURCE CONTEXT MANAGEMENT
// ============================================================================

/// Set source context for current thread
pub fn set_source_context(source: PathBuf, line: usize) {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(SourceContext { source, line });
    });
}

/// Clear source context for current thread
pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with source context
pub fn with_source_context<F, R>(source: PathBuf, line: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_source_context(source, line);
    let result = f();
    clear_source_context();
    result
}

/// Get current source context (used by macros)
pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn attach_context(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(source_ctx) = get_current_source_context() {
        event = event.with_context("source", &source_ctx.source.display().to_string());
        event = event.with_context("line", &source_ctx.line.to_string());
    }

    event
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = LogEvent::error(code, message);
    if let Some(s) = span {
        event = event.with_span(s);
    }

    logger.log_event(attach_context(event, context));
}

/// Log a prepared event with context (used by the non-error macros)
pub fn log_with_context(event: LogEvent, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        if logger.should_log(event.level) {
            logger.log_event(attach_context(event, context));
        }
    }
}
