//! Minimal component: logs and waits.

use component_runtime::{Activity, ComponentContext};
use std::thread;
use std::time::Duration;
use tracing::info;

pub const NAME: &str = "Dummy";

/// Pause between cycles.
pub const CYCLE: Duration = Duration::from_secs(1);

/// Logs once per second and does nothing else.
#[derive(Debug, Default)]
pub struct Dummy {
    cycles: u64,
}

impl Dummy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed `main_loop` invocations.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Activity for Dummy {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Example component that only logs"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_started(&mut self, _ctx: &ComponentContext) -> bool {
        info!("I'm a dummy example, I'm not doing anything at startup. Sorry.");
        true
    }

    fn on_stopped(&mut self, _ctx: &ComponentContext) {
        info!(cycles = self.cycles, "I'm a dummy example, I'm not doing anything when stopping. Sorry.");
    }

    fn main_loop(&mut self, _ctx: &ComponentContext) {
        info!("I'm a dummy example, I'm just waiting and printing as my main activity. Sorry.");
        thread::sleep(CYCLE);
        self.cycles += 1;
    }
}
