//! Global log sink with a runtime-adjustable level.
//!
//! The sink is a `tracing-subscriber` registry with a reloadable
//! [`LevelFilter`] in front of a `fmt` layer. Components never touch the
//! subscriber directly: they emit `tracing` events inside their `component`
//! span and change verbosity through [`set_level`].

use std::sync::OnceLock;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, Registry};

use crate::{LogLevel, TelemetryConfig, TelemetryError};

type LevelHandle = reload::Handle<LevelFilter, Registry>;

static LEVEL_HANDLE: OnceLock<LevelHandle> = OnceLock::new();

/// Install the global log sink.
///
/// # Errors
///
/// `TelemetryError::AlreadyInitialized` if a global subscriber is already
/// installed (by this function or anything else).
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let (filter, handle) = reload::Layer::new(config.log_level.to_filter());
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(config.with_target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(config.with_target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init()
    };
    installed.map_err(|_| TelemetryError::AlreadyInitialized)?;

    if LEVEL_HANDLE.set(handle).is_err() {
        return Err(TelemetryError::AlreadyInitialized);
    }

    tracing::debug!(level = %config.log_level, json = config.json_logs, "Logging initialized");
    Ok(())
}

/// Change the global level.
///
/// Returns `false` and does nothing if [`init_logging`] never succeeded.
pub fn set_level(level: LogLevel) -> bool {
    let Some(handle) = LEVEL_HANDLE.get() else {
        return false;
    };
    handle.reload(level.to_filter()).is_ok()
}

/// Whether [`init_logging`] has installed the sink.
#[must_use]
pub fn is_initialized() -> bool {
    LEVEL_HANDLE.get().is_some()
}
