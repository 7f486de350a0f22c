//! Shared fixtures for the integration tests.

use component_runtime::{Activity, Component, ComponentContext, PubSubExecutor};
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Version every probe reports unless told otherwise.
pub const PROBE_VERSION: &str = "1.0.0";

/// Upper bound for any wait in the suite.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// What a [`Probe`] observed.
#[derive(Debug, Default)]
pub struct ProbeCounters {
    pub started: AtomicBool,
    pub stopped: AtomicBool,
    pub loops: AtomicUsize,
}

impl ProbeCounters {
    #[must_use]
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn loops(&self) -> usize {
        self.loops.load(Ordering::SeqCst)
    }
}

/// Activity recording its hook invocations.
///
/// A probe either stops itself after one cycle or keeps cycling every few
/// milliseconds until stopped.
#[derive(Debug)]
pub struct Probe {
    name: String,
    version: String,
    forever: bool,
    counters: Arc<ProbeCounters>,
}

impl Probe {
    #[must_use]
    pub fn once(name: &str) -> Self {
        Self::new(name, false)
    }

    #[must_use]
    pub fn forever(name: &str) -> Self {
        Self::new(name, true)
    }

    fn new(name: &str, forever: bool) -> Self {
        Self {
            name: name.to_owned(),
            version: PROBE_VERSION.to_owned(),
            forever,
            counters: Arc::default(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_owned();
        self
    }

    #[must_use]
    pub fn counters(&self) -> Arc<ProbeCounters> {
        Arc::clone(&self.counters)
    }
}

impl Activity for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn on_started(&mut self, _ctx: &ComponentContext) -> bool {
        self.counters.started.store(true, Ordering::SeqCst);
        true
    }

    fn on_stopped(&mut self, _ctx: &ComponentContext) {
        self.counters.stopped.store(true, Ordering::SeqCst);
    }

    fn main_loop(&mut self, ctx: &ComponentContext) {
        self.counters.loops.fetch_add(1, Ordering::SeqCst);
        if self.forever {
            thread::sleep(Duration::from_millis(5));
        } else {
            ctx.stop();
        }
    }
}

/// Component around `probe` with a small executor of its own.
///
/// # Panics
///
/// If the executor cannot be built.
#[must_use]
pub fn component(probe: Probe) -> Component<Probe> {
    let executor = PubSubExecutor::with_threads(2).expect("pub/sub executor");
    Component::with_executor(probe, executor)
}

/// An ephemeral port that was free a moment ago.
///
/// # Panics
///
/// If no loopback port can be bound.
#[must_use]
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("ephemeral port")
        .port()
}

/// TOML configuration for `version` with the given publish ports and any
/// further raw TOML appended.
#[must_use]
pub fn config_toml(version: &str, publishers: &[(&str, u16)], extra: &str) -> String {
    let mut toml = format!("project_version = \"{}\"\n\n[Publisher]\n", version);
    for (name, port) in publishers {
        let _ = writeln!(toml, "{} = {}", name, port);
    }
    toml.push('\n');
    toml.push_str(extra);
    toml
}

/// Write `content` to a temporary file that lives as long as the handle.
///
/// # Panics
///
/// If the file cannot be written.
#[must_use]
pub fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temporary file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

/// Poll `condition` until it holds or [`TIMEOUT`] elapses.
#[must_use]
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_layout() {
        let toml = config_toml("1.0.0", &[("A", 7000), ("B", 7001)], "[A]\nkey = 1\n");

        assert_eq!(
            toml,
            "project_version = \"1.0.0\"\n\n[Publisher]\nA = 7000\nB = 7001\n\n[A]\nkey = 1\n"
        );
    }
}
