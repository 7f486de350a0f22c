//! # Shared Config
//!
//! Configuration collaborator for the component harness: a file-based store
//! with dotted key-path lookup.
//!
//! ## Namespaces
//!
//! | Path | Owner | Meaning |
//! |------|-------|---------|
//! | `project_version` | lifecycle core | Must equal the component version or startup aborts |
//! | `Publisher.<name>` | pub/sub layer | TCP port the component `<name>` publishes on |
//! | `<name>.<key>` | component `<name>` | Component-specific settings |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod store;

pub use store::{Configuration, PATH_SEPARATOR};

/// Top-level key holding the project version a configuration file targets.
pub const PROJECT_VERSION_KEY: &str = "project_version";

/// Table holding the publish port of every component.
pub const PUBLISHER_TABLE: &str = "Publisher";

/// Path of the publish port for `component_name`.
#[must_use]
pub fn publisher_port_path(component_name: &str) -> String {
    format!("{}{}{}", PUBLISHER_TABLE, PATH_SEPARATOR, component_name)
}

/// Path of `key` inside the namespace of `component_name`.
#[must_use]
pub fn component_setting_path(component_name: &str, key: &str) -> String {
    format!("{}{}{}", component_name, PATH_SEPARATOR, key)
}
