//! Hardware abstractions read by components.

mod simulated;

pub use simulated::SimulatedThermometer;

use tracing::warn;

/// A piece of hardware.
pub trait Device: Send {
    fn name(&self) -> &str;
}

/// A device measuring temperature in degrees Celsius.
pub trait Thermometer: Device {
    /// Current reading, `None` if the device could not be read.
    fn temperature(&mut self) -> Option<f32>;
}

/// Thermometer selected at build time through `GROW_THERMOMETER_DEVICE`.
pub const THERMOMETER_DEVICE: Option<&str> = option_env!("GROW_THERMOMETER_DEVICE");

/// Build the thermometer called `name`.
///
/// Unknown names fall back to the simulated device.
#[must_use]
pub fn thermometer_by_name(name: Option<&str>) -> Box<dyn Thermometer> {
    match name {
        Some(SimulatedThermometer::NAME) => Box::new(SimulatedThermometer::new()),
        _ => {
            warn!(
                device = name.unwrap_or("<unset>"),
                "No valid thermometer device specified at build time, going with simulated hardware"
            );
            Box::new(SimulatedThermometer::new())
        }
    }
}
