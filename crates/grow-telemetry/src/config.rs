//! Logging configuration from environment variables.

use std::env;

use crate::{LogLevel, TelemetryError};

/// Configuration of the log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Initial level filter
    pub log_level: LogLevel,

    /// Emit one JSON object per line instead of human-readable text
    pub json_logs: bool,

    /// Include the emitting thread id (worker vs. pub/sub threads)
    pub thread_ids: bool,

    /// Include the module target of each event
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            thread_ids: false,
            with_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GROW_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `GROW_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `GROW_LOG_THREAD_IDS`: Include thread ids (default: false)
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidLevel` if `GROW_LOG_LEVEL` is set to
    /// an unknown level name.
    pub fn from_env() -> Result<Self, TelemetryError> {
        let log_level = match env::var("GROW_LOG_LEVEL") {
            Ok(level) => level.parse()?,
            // RUST_LOG may hold per-target directives; only a bare level applies.
            Err(_) => env::var("RUST_LOG")
                .ok()
                .and_then(|level| level.parse().ok())
                .unwrap_or_default(),
        };

        Ok(Self {
            log_level,
            json_logs: flag("GROW_JSON_LOGS"),
            thread_ids: flag("GROW_LOG_THREAD_IDS"),
            with_target: false,
        })
    }

    /// Same configuration with a different level.
    #[must_use]
    pub fn with_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
