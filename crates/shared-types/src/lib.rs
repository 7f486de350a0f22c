//! # Shared Types Crate
//!
//! Error model shared by every crate of the component harness.
//!
//! ## Design Principles
//!
//! - **No exceptions across boundaries**: recoverable failures are returned as
//!   `Result<T, TaggedError<K>>`, never as panics.
//! - **Enumerated kinds**: callers branch on the kind, the detail text is for
//!   humans and logs only.

pub mod errors;

pub use errors::*;
