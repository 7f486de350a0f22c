//! Shared `main` of the component binaries.

use anyhow::{Context, Result};
use component_runtime::{Activity, Component};
use grow_telemetry::{init_logging, TelemetryConfig};
use std::process::ExitCode;
use tracing::{error, info};

/// Run `activity` as the process' component until it stops.
///
/// Logging is configured from the environment first, then refined by
/// `--loglevel`. Termination signals stop the component gracefully.
///
/// # Errors
///
/// If logging or the pub/sub executor cannot be set up.
pub fn run<A: Activity>(activity: A) -> Result<ExitCode> {
    init_logging(&TelemetryConfig::from_env()?).context("Unable to initialize logging")?;

    let mut component = Component::new(activity).context("Unable to start the pub/sub executor")?;
    if !component.parse_cmd_arguments(std::env::args_os()) {
        return Ok(ExitCode::FAILURE);
    }

    info!(component = %component.signature(), "Launching");
    let _signals = component.install_signal_handler();

    if !component.start_blocking() {
        error!(component = %component.signature(), "Component failed to start");
        return Ok(ExitCode::FAILURE);
    }

    info!(component = %component.signature(), "Exiting");
    Ok(ExitCode::SUCCESS)
}
