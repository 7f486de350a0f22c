//! # Component Runtime
//!
//! Lifecycle core of the Grow harness. A component is one [`Activity`]
//! run on a private worker thread, configured from a TOML file and talking
//! to other components through the port-keyed pub/sub layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use component_runtime::{Activity, Component, ComponentContext};
//!
//! struct Heartbeat;
//!
//! impl Activity for Heartbeat {
//!     fn name(&self) -> &str { "Heartbeat" }
//!     fn version(&self) -> &str { env!("CARGO_PKG_VERSION") }
//!     fn on_started(&mut self, _ctx: &ComponentContext) -> bool { true }
//!     fn on_stopped(&mut self, _ctx: &ComponentContext) {}
//!     fn main_loop(&mut self, ctx: &ComponentContext) {
//!         let _ = ctx.publish("BEAT", &serde_json::json!({}));
//!         std::thread::sleep(std::time::Duration::from_secs(1));
//!     }
//! }
//!
//! let mut component = Component::new(Heartbeat)?;
//! if component.parse_cmd_arguments(std::env::args()) {
//!     let _signals = component.install_signal_handler();
//!     component.start_blocking();
//! }
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load the configuration file, if a path was set
//! 2. Check its `project_version` against the component version
//! 3. Run `on_started`
//! 4. Spawn the worker thread

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod activity;
pub mod cli;
mod completion;
pub mod component;
pub mod context;
pub mod control;
pub mod signals;

pub use activity::{Activity, DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_VERSION};
pub use cli::CommandLine;
pub use component::Component;
pub use context::{ComponentContext, Identity};
pub use control::{RunState, StopHandle};
pub use signals::{install_signal_handler, SignalRegistration};

// Re-exported so activities need only this crate.
pub use grow_telemetry::LogLevel;
pub use shared_bus::{Delivery, Envelope, PubSubExecutor};
pub use shared_types::{PublishError, SubscriberError, TaggedError};
