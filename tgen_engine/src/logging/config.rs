//! Environment-driven logging configuration
//!
//! `TGEN_LOG_LEVEL` selects the minimum level (error/warn/info/debug);
//! `TGEN_LOG_FORMAT=json` switches the console logger to structured
//! output. Defaults are info-level plain text.

use super::events::LogLevel;
use std::env;

/// Minimum level to emit
pub fn get_min_log_level() -> LogLevel {
    match env::var("TGEN_LOG_LEVEL").as_deref() {
        Ok("error") => LogLevel::Error,
        Ok("warn") => LogLevel::Warning,
        Ok("debug") => LogLevel::Debug,
        _ => LogLevel::Info,
    }
}

/// Whether to emit JSON events instead of plain text
pub fn use_structured_logging() -> bool {
    matches!(env::var("TGEN_LOG_FORMAT").as_deref(), Ok("json"))
}
