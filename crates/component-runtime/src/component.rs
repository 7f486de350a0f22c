//! # Component
//!
//! Lifecycle core: owns an [`Activity`], its worker thread, the
//! configuration store and the pub/sub pool.
//!
//! ## State Machine
//!
//! ```text
//! Stopped ──start()──→ Running ──stop()──→ Stopping ──→ Stopped
//!    ↑       (config ok,                   (current main_loop returns,
//!    │        on_started true)              on_stopped if graceful)
//!    └──────────────── drop: abort, skip on_stopped, join ─────────┘
//! ```
//!
//! ## Threading
//!
//! | Thread | Runs |
//! |--------|------|
//! | caller | `start`, `on_started`, blocking waits |
//! | worker (named after the component) | `main_loop`, `on_stopped` |
//! | pub/sub executor | transport, subscription callbacks, signal mapping |

use grow_telemetry::{component_span, LogLevel};
use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_bus::{Delivery, PubSubExecutor};
use shared_config::PROJECT_VERSION_KEY;
use shared_types::{PublishResult, SubscribeResult};
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::activity::Activity;
use crate::cli::CommandLine;
use crate::context::{ComponentContext, Identity};
use crate::control::{RunState, StopHandle};
use crate::signals::{install_signal_handler, SignalRegistration};

/// A single-purpose service unit driving one [`Activity`] on its own thread.
pub struct Component<A: Activity> {
    activity: Arc<Mutex<A>>,
    context: ComponentContext,
    executor: Arc<PubSubExecutor>,
    config_path: Option<PathBuf>,
    worker: Option<JoinHandle<()>>,
}

impl<A: Activity> Component<A> {
    /// Wrap `activity` with a pub/sub executor of its own.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the executor threads cannot be spawned.
    pub fn new(activity: A) -> io::Result<Self> {
        Ok(Self::with_executor(activity, PubSubExecutor::new()?))
    }

    /// Wrap `activity`, running its pub/sub traffic on `executor`.
    #[must_use]
    pub fn with_executor(activity: A, executor: Arc<PubSubExecutor>) -> Self {
        let identity = Identity {
            name: activity.name().to_owned(),
            description: activity.description().to_owned(),
            version: activity.version().to_owned(),
        };

        Self {
            context: ComponentContext::new(identity, Arc::clone(&executor)),
            activity: Arc::new(Mutex::new(activity)),
            executor,
            config_path: None,
            worker: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.context.name()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.context.description()
    }

    #[must_use]
    pub fn version(&self) -> &str {
        self.context.version()
    }

    #[must_use]
    pub fn signature(&self) -> String {
        self.context.signature()
    }

    /// Configuration file loaded by the next [`Self::start`].
    pub fn set_configuration_path(&mut self, path: impl Into<PathBuf>) {
        self.config_path = Some(path.into());
    }

    #[must_use]
    pub fn configuration_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Change the process log level. Returns `false` if logging was never
    /// initialized.
    pub fn set_log_level(&self, level: LogLevel) -> bool {
        grow_telemetry::set_level(level)
    }

    /// Apply `-c/--config` and `-l/--loglevel` from `args` (program name
    /// first).
    ///
    /// Returns `false` when the caller should not proceed: help was
    /// requested or the arguments are invalid. The help or usage has been
    /// printed in that case.
    pub fn parse_cmd_arguments<I, T>(&mut self, args: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match CommandLine::try_parse_for(self.name(), self.description(), args) {
            Ok(cli) => {
                self.set_log_level(cli.loglevel);
                if let Some(path) = cli.config {
                    self.set_configuration_path(path);
                }
                true
            }
            Err(e) => {
                if let Err(print_error) = e.print() {
                    warn!(error = %print_error, "Unable to print usage");
                }
                false
            }
        }
    }

    /// Load the configuration, run `on_started` and spawn the worker.
    ///
    /// Returns `false` without spawning anything if the component is
    /// running or still stopping, the configuration cannot be loaded or
    /// targets another version, `on_started` refuses, or the worker thread
    /// cannot be spawned.
    pub fn start(&mut self) -> bool {
        let _span = component_span!(self.name()).entered();
        let shared = self.context.shared();

        if shared.control.running() {
            warn!("Trying to start an already running component. No effect");
            return false;
        }
        if !shared.completion.is_finished() {
            warn!("Trying to start a component that is still stopping. No effect");
            return false;
        }

        info!("Starting component");

        if let Some(path) = &self.config_path {
            if !self.load_configuration(path) {
                return false;
            }
        }

        if let Some(previous) = self.worker.take() {
            join_worker(previous);
        }

        if !self.activity.lock().on_started(&self.context) {
            warn!("Startup refused by the component");
            return false;
        }

        shared.completion.reset();
        shared.control.set_running();

        let activity = Arc::clone(&self.activity);
        let context = self.context.clone();
        let spawned = thread::Builder::new()
            .name(self.name().to_owned())
            .spawn(move || run_worker(&activity, &context));

        match spawned {
            Ok(worker) => {
                self.worker = Some(worker);
                true
            }
            Err(e) => {
                error!(error = %e, "Unable to spawn worker thread");
                shared.control.abort();
                shared.completion.finish();
                false
            }
        }
    }

    /// Request a stop without waiting for the worker.
    ///
    /// Returns `false` if the component is not running.
    pub fn stop(&self) -> bool {
        self.context.stop()
    }

    /// [`Self::start`], then wait until the worker has finished.
    pub fn start_blocking(&mut self) -> bool {
        if !self.start() {
            return false;
        }
        self.context.shared().completion.wait();
        true
    }

    /// [`Self::stop`], then wait until the worker has finished, even if
    /// this call did not stop it. Returns what `stop` returned.
    ///
    /// Called from the worker thread itself it does not wait.
    pub fn stop_blocking(&self) -> bool {
        let stopped = self.stop();

        if self.on_worker_thread() {
            debug!("Blocking stop requested from the worker thread, not waiting");
            return stopped;
        }

        self.context.shared().completion.wait();
        stopped
    }

    /// Whether the run flag is set.
    #[must_use]
    pub fn running(&self) -> bool {
        self.context.running()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        let shared = self.context.shared();
        if shared.control.running() {
            RunState::Running
        } else if shared.completion.is_finished() {
            RunState::Stopped
        } else {
            RunState::Stopping
        }
    }

    /// Typed lookup of `<name>.<key>` in the loaded configuration.
    #[must_use]
    pub fn setting_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.context.setting_value(key)
    }

    /// See [`ComponentContext::publish`].
    ///
    /// # Errors
    ///
    /// As [`ComponentContext::publish`].
    pub fn publish(&self, topic: &str, payload: &Value) -> PublishResult {
        self.context.publish(topic, payload)
    }

    /// See [`ComponentContext::subscribe`].
    ///
    /// # Errors
    ///
    /// As [`ComponentContext::subscribe`].
    pub fn subscribe<F>(&self, component_name: &str, callback: F) -> SubscribeResult
    where
        F: Fn(Delivery) + Send + Sync + 'static,
    {
        self.context.subscribe(component_name, callback)
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.context.stop_handle()
    }

    /// Map process termination signals onto this component's stop handle.
    ///
    /// # Panics
    ///
    /// If another component already holds the signal registration.
    pub fn install_signal_handler(&self) -> SignalRegistration {
        install_signal_handler(&self.executor, self.stop_handle())
    }

    #[must_use]
    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    #[must_use]
    pub fn executor(&self) -> &Arc<PubSubExecutor> {
        &self.executor
    }

    /// Lock the activity.
    ///
    /// The worker holds this lock for its whole run, so this blocks while
    /// the component is running or stopping.
    pub fn activity(&self) -> MutexGuard<'_, A> {
        self.activity.lock()
    }

    fn load_configuration(&self, path: &Path) -> bool {
        info!(path = %path.display(), "Loading configuration file");

        let mut configuration = self.context.shared().configuration.write();
        if let Err(e) = configuration.load_from_file(path) {
            error!(error = %e, "Error loading configuration file");
            return false;
        }

        match configuration.setting_value::<String>(PROJECT_VERSION_KEY) {
            None => {
                error!("Configuration file does not contain project version information");
                false
            }
            Some(config_version) if config_version != self.version() => {
                error!(
                    config_version = %config_version,
                    version = %self.version(),
                    "Configuration file version does not match project version"
                );
                false
            }
            Some(_) => true,
        }
    }

    fn on_worker_thread(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.thread().id() == thread::current().id())
    }
}

impl<A: Activity> Drop for Component<A> {
    fn drop(&mut self) {
        self.context.shared().control.abort();
        if let Some(worker) = self.worker.take() {
            join_worker(worker);
        }
    }
}

impl<A: Activity> fmt::Debug for Component<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("signature", &self.signature())
            .field("state", &self.state())
            .field("config_path", &self.config_path)
            .finish()
    }
}

fn run_worker<A: Activity>(activity: &Mutex<A>, context: &ComponentContext) {
    let _span = component_span!(context.name()).entered();
    let shared = context.shared();
    let _finished = shared.completion.finish_on_drop();
    let mut activity = activity.lock();

    debug!("Worker started");
    while shared.control.running() {
        activity.main_loop(context);
    }

    if shared.control.graceful() {
        activity.on_stopped(context);
    }
    info!("Component stopped");
}

fn join_worker(worker: JoinHandle<()>) {
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }
}
