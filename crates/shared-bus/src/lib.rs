//! # Shared Bus - Port-Keyed Publish/Subscribe
//!
//! Every component publishes on one TCP port of its own and subscribes to
//! the ports of the components it listens to.
//!
//! ## Message Flow
//!
//! ```text
//! ┌──────────────┐                          ┌──────────────┐
//! │ Component A  │  publish_json()          │ Component B  │
//! │              │ ──────┐                  │              │
//! └──────────────┘       │                  └──────────────┘
//!                        ▼                          ↑
//!               ┌─────────────────┐                 │
//!               │ Publisher :7000 │ ── TOPIC#{..} ──┘
//!               └─────────────────┘   subscribe_json(7000)
//! ```
//!
//! ## Layers
//!
//! - [`frame`]: topic/payload framing and the software version check
//! - [`publisher`] / [`subscriber`]: the TCP transport, one frame per send
//! - [`pool`]: at most one publisher and one subscriber per port
//! - [`executor`]: the bounded worker pool all of the above run on

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod executor;
pub mod frame;
pub mod pool;
pub mod publisher;
pub mod subscriber;
mod wire;

// Re-export main types
pub use executor::{PubSubExecutor, WORKER_THREAD_NAME};
pub use frame::{Envelope, TOPIC_DELIMITER, VERSION_FIELD};
pub use pool::{Delivery, PubSubPool};
pub use publisher::Publisher;
pub use subscriber::{FrameCallback, Subscriber, RECONNECT_INTERVAL};

/// Worker threads of the default executor.
pub const MAXIMUM_PUBSUB_THREADS: usize = 6;

/// Largest frame accepted on the wire.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Frames buffered per subscriber session before it starts lagging.
pub const SESSION_QUEUE_CAPACITY: usize = 1024;

/// Subscriptions always connect to this host.
pub const LOOPBACK_HOST: &str = "127.0.0.1";
