//! Global logging for the template engine
//!
//! A process-wide `LoggingService` behind a `OnceLock`. The engine itself
//! never requires logging to be initialized; every macro degrades to a
//! no-op when the global service is absent, which keeps library embedders
//! in full control of output.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Initialize global logging from environment configuration
pub fn init_global_logging() -> Result<(), String> {
    let service = Arc::new(LoggingService::with_config());
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::LOGGING_INITIALIZED,
        "Global logging initialized",
    ));
    Ok(())
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to the global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Macro support: log an error with code, span, and context pairs
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, String)>,
) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::error(code, message);
        if let Some(s) = span {
            event = event.with_span(s);
        }
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}

/// Macro support: log a success with code and context pairs
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::success(code, message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}

/// Macro support: log an info message with context pairs
pub fn log_info_with_context(message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::info(message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}
