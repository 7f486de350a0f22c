//! # Grow Telemetry
//!
//! Logging collaborator of the component harness: a leveled sink whose lines
//! are attributed to the emitting component.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grow_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env()?)?;
//!     // components log inside their own `component{name=..}` span
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GROW_LOG_LEVEL` | `info` | Log level filter |
//! | `GROW_JSON_LOGS` | `false` | JSON formatted lines |
//! | `GROW_LOG_THREAD_IDS` | `false` | Include thread ids |

mod config;
mod level;
mod logging;

pub use config::TelemetryConfig;
pub use level::LogLevel;
pub use logging::{init_logging, is_initialized, set_level};

use thiserror::Error;

/// Name of the span every component logs inside.
pub const COMPONENT_SPAN: &str = "component";

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("A global log subscriber is already installed")]
    AlreadyInitialized,

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}

/// Span attributing every event inside it to component `name`.
///
/// # Example
///
/// ```rust,ignore
/// let span = grow_telemetry::component_span!("Temperature");
/// let _entered = span.enter();
/// tracing::info!("Starting component");
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr) => {
        tracing::info_span!("component", name = %$name)
    };
}
