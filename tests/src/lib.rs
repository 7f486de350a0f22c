//! # Grow Test Suite
//!
//! Cross-crate integration tests.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Probe activity, config files, free ports
//! └── integration/
//!     ├── lifecycle.rs  # Start/stop semantics with real config files
//!     └── pubsub.rs     # Component-to-component messaging
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p grow-tests
//! cargo test -p grow-tests integration::pubsub::
//! ```

pub mod fixtures;
pub mod integration;
