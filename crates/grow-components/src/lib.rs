//! # Grow Components
//!
//! Concrete components of the Grow harness and the devices they read.
//!
//! | Component | Publishes | Binary |
//! |-----------|-----------|--------|
//! | [`Temperature`] | `TEMPERATURE` every `poll_time` ms | `temperature` |
//! | [`Dummy`] | nothing | `dummy` |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod device;
pub mod dummy;
pub mod launch;
pub mod temperature;

pub use device::{Device, SimulatedThermometer, Thermometer};
pub use dummy::Dummy;
pub use temperature::Temperature;
