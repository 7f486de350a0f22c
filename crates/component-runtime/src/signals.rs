//! OS signal to stop-handle mapping.
//!
//! ## Unix
//! SIGINT, SIGTERM and SIGQUIT each request a stop, with
//! [`tokio::signal::ctrl_c`] awaited as a fallback.
//!
//! ## Other platforms
//! Only Ctrl-C is handled.
//!
//! One registration may be live per process. Once a signal has been hooked
//! the process keeps ignoring its default action after the registration is
//! dropped; signals arriving then are simply discarded.

use shared_bus::PubSubExecutor;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::control::StopHandle;

static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Keeps the signal mapping alive. Dropping it releases the registration.
#[derive(Debug)]
#[must_use = "dropping the registration uninstalls the signal mapping"]
pub struct SignalRegistration {
    task: JoinHandle<()>,
}

impl Drop for SignalRegistration {
    fn drop(&mut self) {
        self.task.abort();
        REGISTERED.store(false, Ordering::Release);
    }
}

/// Stop `handle` whenever the process receives a termination signal.
///
/// The listener runs on `executor`.
///
/// # Panics
///
/// If another registration is still live. Two components competing for
/// process signals is a wiring error in the hosting binary.
pub fn install_signal_handler(executor: &PubSubExecutor, handle: StopHandle) -> SignalRegistration {
    if REGISTERED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        panic!(
            "Signal handler requested for {} while another component is registered",
            handle.name()
        );
    }

    SignalRegistration {
        task: executor.spawn(forward_signals(handle)),
    }
}

/// Whether a registration is currently live.
#[must_use]
pub fn is_registered() -> bool {
    REGISTERED.load(Ordering::Acquire)
}

async fn forward_signals(handle: StopHandle) {
    loop {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(component = handle.name(), error = %e, "Unable to listen for signals");
            return;
        }
        info!(component = handle.name(), "Shutdown signal received");
        handle.stop();
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
