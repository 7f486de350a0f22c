//! # Component Context
//!
//! What an activity sees of its component: identity, run flag, settings and
//! the pub/sub endpoints. Cheap to clone; clones share the same component.
//!
//! ## Port Resolution
//!
//! | Operation | Port read from |
//! |-----------|----------------|
//! | `publish(topic, payload)` | `Publisher.<own name>` |
//! | `subscribe(target, callback)` | `Publisher.<target>` |

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_bus::{frame, Delivery, PubSubExecutor, PubSubPool};
use shared_config::{component_setting_path, publisher_port_path, Configuration};
use shared_types::{
    PublishError, PublishResult, SubscribeResult, SubscriberError, TaggedError,
};
use std::fmt;
use std::sync::Arc;

use crate::completion::Completion;
use crate::control::{RunControl, StopHandle};

/// Name, description and version of a component, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl Identity {
    /// `"<name> v<version>"`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}

pub(crate) struct Shared {
    pub(crate) identity: Identity,
    pub(crate) control: Arc<RunControl>,
    pub(crate) completion: Completion,
    pub(crate) configuration: RwLock<Configuration>,
    pub(crate) pool: PubSubPool,
}

/// Handle passed to every [`Activity`](crate::Activity) hook.
#[derive(Clone)]
pub struct ComponentContext {
    shared: Arc<Shared>,
}

impl ComponentContext {
    pub(crate) fn new(identity: Identity, executor: Arc<PubSubExecutor>) -> Self {
        let control = Arc::new(RunControl::new(identity.name.clone()));
        Self {
            shared: Arc::new(Shared {
                identity,
                control,
                completion: Completion::new(),
                configuration: RwLock::new(Configuration::new()),
                pool: PubSubPool::new(executor),
            }),
        }
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.shared.identity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.identity.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.shared.identity.description
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.shared.identity.version
    }

    /// `"<name> v<version>"`.
    #[must_use]
    pub fn signature(&self) -> String {
        self.shared.identity.signature()
    }

    /// Whether the run flag is set.
    #[must_use]
    pub fn running(&self) -> bool {
        self.shared.control.running()
    }

    /// Request a stop; the current `main_loop` invocation is the last one.
    pub fn stop(&self) -> bool {
        self.shared.control.stop()
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.shared.control))
    }

    /// Typed lookup of `<name>.<key>` in the loaded configuration.
    #[must_use]
    pub fn setting_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.shared
            .configuration
            .read()
            .setting_value(&component_setting_path(self.name(), key))
    }

    /// Publish `payload` under `topic` on this component's port.
    ///
    /// The payload is stamped with this component's version before it is
    /// framed.
    ///
    /// # Errors
    ///
    /// - `INVALID_PAYLOAD` if the payload is not an object or already has a
    ///   `version` field
    /// - `NETWORK_CONFIGURATION_MISSING` if `Publisher.<name>` is not set
    /// - `INVALID_TOPIC` / `INVALID_PAYLOAD` on framing errors
    /// - `UNABLE_TO_SEND` on transport failure
    pub fn publish(&self, topic: &str, payload: &Value) -> PublishResult {
        let serialized = frame::stamp_version(payload, self.version())?;

        let port = self.publish_port(self.name()).ok_or_else(|| {
            TaggedError::with_detail(
                PublishError::NetworkConfigurationMissing,
                "Network configuration is missing for this component",
            )
        })?;

        self.shared.pool.publish(port, topic, &serialized)
    }

    /// Subscribe to everything `component_name` publishes.
    ///
    /// `callback` runs on a pub/sub executor thread, concurrently with the
    /// worker thread. It receives `Ok` only for frames stamped with this
    /// component's version.
    ///
    /// # Errors
    ///
    /// - `NETWORK_CONFIGURATION_MISSING` if `Publisher.<component_name>` is
    ///   not set
    /// - `ALREADY_SUBSCRIBED` if that port already has a subscriber
    pub fn subscribe<F>(&self, component_name: &str, callback: F) -> SubscribeResult
    where
        F: Fn(Delivery) + Send + Sync + 'static,
    {
        let port = self.publish_port(component_name).ok_or_else(|| {
            TaggedError::with_detail(
                SubscriberError::NetworkConfigurationMissing,
                format!(
                    "Network configuration is missing for the {} component",
                    component_name
                ),
            )
        })?;

        self.shared.pool.subscribe_json(port, self.version(), callback)
    }

    fn publish_port(&self, component_name: &str) -> Option<u16> {
        self.shared
            .configuration
            .read()
            .setting_value(&publisher_port_path(component_name))
    }
}

impl fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("identity", &self.shared.identity)
            .field("running", &self.running())
            .field("pool", &self.shared.pool)
            .finish()
    }
}
