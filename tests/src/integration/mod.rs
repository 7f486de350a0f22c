//! Integration tests, one module per concern.

pub mod lifecycle;
pub mod pubsub;
