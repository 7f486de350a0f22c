//! Run flags shared between the lifecycle core, its worker thread and any
//! stop handle given out to the hosting process.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Observable run state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No worker thread is active.
    Stopped,
    /// The worker thread is looping over the activity.
    Running,
    /// A stop was requested; the worker is finishing its current cycle and
    /// the shutdown hook.
    Stopping,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Stopping => "stopping",
        })
    }
}

#[derive(Debug)]
pub(crate) struct RunControl {
    name: String,
    should_run: AtomicBool,
    graceful_stop: AtomicBool,
}

impl RunControl {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            should_run: AtomicBool::new(false),
            graceful_stop: AtomicBool::new(true),
        }
    }

    pub(crate) fn running(&self) -> bool {
        self.should_run.load(Ordering::Acquire)
    }

    /// Arm a new run. Every run starts out graceful.
    pub(crate) fn set_running(&self) {
        self.graceful_stop.store(true, Ordering::Release);
        self.should_run.store(true, Ordering::Release);
    }

    /// Clear the run flag. Only the caller that actually cleared it gets
    /// `true`.
    pub(crate) fn stop(&self) -> bool {
        let _span = grow_telemetry::component_span!(self.name).entered();
        if self.should_run.swap(false, Ordering::AcqRel) {
            info!("Stopping component");
            true
        } else {
            warn!("Trying to stop an already stopped component. No effect");
            false
        }
    }

    /// Clear the run flag and skip the shutdown hook.
    pub(crate) fn abort(&self) {
        self.graceful_stop.store(false, Ordering::Release);
        self.should_run.store(false, Ordering::Release);
    }

    pub(crate) fn graceful(&self) -> bool {
        self.graceful_stop.load(Ordering::Acquire)
    }
}

/// Cloneable handle that stops a component from any thread.
///
/// This is what signal handlers and supervising code hold instead of the
/// component itself.
#[derive(Clone)]
pub struct StopHandle {
    control: Arc<RunControl>,
}

impl StopHandle {
    pub(crate) fn new(control: Arc<RunControl>) -> Self {
        Self { control }
    }

    /// Request a stop. Returns `false` if the component was not running.
    ///
    /// Never waits for the worker thread.
    pub fn stop(&self) -> bool {
        self.control.stop()
    }

    /// Whether the component's run flag is set.
    #[must_use]
    pub fn running(&self) -> bool {
        self.control.running()
    }

    /// Name of the component this handle stops.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.control.name
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("name", &self.control.name)
            .field("running", &self.running())
            .finish()
    }
}
