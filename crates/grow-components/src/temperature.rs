//! # Temperature Component
//!
//! Polls a thermometer and publishes every reading.
//!
//! ## Configuration
//!
//! ```toml
//! project_version = "0.1.0"
//!
//! [Publisher]
//! Temperature = 7000
//!
//! [Temperature]
//! poll_time = 1000   # milliseconds between readings
//! ```
//!
//! ## Messages
//!
//! | Topic | Payload |
//! |-------|---------|
//! | `TEMPERATURE` | `{"temperature": <celsius>, "version": <component version>}` |

use component_runtime::{Activity, ComponentContext};
use serde_json::json;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

use crate::device::{thermometer_by_name, Thermometer, THERMOMETER_DEVICE};

pub const NAME: &str = "Temperature";
pub const TEMPERATURE_TOPIC: &str = "TEMPERATURE";
pub const POLL_TIME_KEY: &str = "poll_time";
pub const POLL_TIME_DEFAULT_MS: u32 = 1000;

/// Publishes the thermometer reading once per poll period.
pub struct Temperature {
    thermometer: Box<dyn Thermometer>,
}

impl Temperature {
    /// Use the thermometer selected at build time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_thermometer(thermometer_by_name(THERMOMETER_DEVICE))
    }

    #[must_use]
    pub fn with_thermometer(thermometer: Box<dyn Thermometer>) -> Self {
        Self { thermometer }
    }

    fn poll_time(ctx: &ComponentContext) -> Duration {
        let millis = ctx.setting_value::<u32>(POLL_TIME_KEY).unwrap_or_else(|| {
            trace!(
                default_ms = POLL_TIME_DEFAULT_MS,
                "Polling time has no valid configuration value, using default instead"
            );
            POLL_TIME_DEFAULT_MS
        });
        Duration::from_millis(u64::from(millis))
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::new()
    }
}

impl Activity for Temperature {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Reads a thermometer and publishes the temperature"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_started(&mut self, ctx: &ComponentContext) -> bool {
        info!(device = self.thermometer.name(), "Using measuring hardware");

        if ctx.setting_value::<u32>(POLL_TIME_KEY).is_none() {
            warn!(
                default_ms = POLL_TIME_DEFAULT_MS,
                "Polling time has no valid configuration value, using default instead"
            );
        }
        true
    }

    fn on_stopped(&mut self, _ctx: &ComponentContext) {}

    fn main_loop(&mut self, ctx: &ComponentContext) {
        match self.thermometer.temperature() {
            Some(celsius) => {
                debug!(celsius, "Registered temperature");
                match ctx.publish(TEMPERATURE_TOPIC, &json!({ "temperature": celsius })) {
                    Ok(()) => trace!(celsius, "Temperature value published"),
                    Err(e) => error!(error = %e, "Unable to publish temperature value"),
                }
            }
            None => error!(device = self.thermometer.name(), "Unable to get temperature"),
        }

        thread::sleep(Self::poll_time(ctx));
    }
}
