//! # Activity
//!
//! The specialization point of a component. The lifecycle core owns one
//! value implementing [`Activity`] and drives it:
//!
//! ```text
//! start() ──→ on_started() ──true──→ [worker thread]
//!                 │                      loop { main_loop() } while running
//!               false                    on_stopped()   (graceful stop only)
//!                 ↓
//!          start() returns false
//! ```

use crate::context::ComponentContext;

/// Name reported by an activity that does not override [`Activity::name`].
pub const DEFAULT_NAME: &str = "Generic";

/// Description reported by an activity that does not override
/// [`Activity::description`].
pub const DEFAULT_DESCRIPTION: &str = "This is a generic component";

/// Version reported by an activity that does not override
/// [`Activity::version`].
pub const DEFAULT_VERSION: &str = "UNKNOWN_VERSION";

/// Work performed by a component.
///
/// `main_loop` is invoked back to back while the component runs, so each
/// invocation should do one unit of work and pace itself (sleep, poll with a
/// timeout). Stop requests are observed only between invocations.
pub trait Activity: Send + 'static {
    /// Component name. Also the configuration namespace and the key of the
    /// component's publish port.
    fn name(&self) -> &str {
        DEFAULT_NAME
    }

    /// One-line description, shown in the CLI help.
    fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    /// Software version. Must match the configuration's `project_version`
    /// and the `version` field of every message this component accepts.
    fn version(&self) -> &str {
        DEFAULT_VERSION
    }

    /// Validate preconditions before the worker is spawned.
    ///
    /// Returning `false` aborts the start.
    fn on_started(&mut self, ctx: &ComponentContext) -> bool;

    /// Release resources after a graceful stop. Skipped on teardown.
    fn on_stopped(&mut self, ctx: &ComponentContext);

    /// One unit of work.
    fn main_loop(&mut self, ctx: &ComponentContext);
}
