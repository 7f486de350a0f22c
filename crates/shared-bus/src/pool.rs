//! # PubSub Pool
//!
//! Port-keyed publishers and subscribers sharing one executor.
//!
//! ## Pooling Rules
//!
//! | Side | Per port | Second request |
//! |------|----------|----------------|
//! | Publisher | at most one, created on first publish | reuses the existing publisher |
//! | Subscriber | at most one, created on subscribe | `ALREADY_SUBSCRIBED` |
//!
//! A publisher whose bind failed is not kept, so the next publish on that
//! port tries to bind again.

use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{
    PublishError, PublishResult, SubscribeResult, SubscriberError, TaggedError,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::executor::PubSubExecutor;
use crate::frame::{self, Envelope};
use crate::publisher::Publisher;
use crate::subscriber::Subscriber;
use crate::{LOOPBACK_HOST, MAX_FRAME_LEN};

/// Outcome of one received message, as handed to subscriber callbacks.
pub type Delivery = Result<Envelope, TaggedError<SubscriberError>>;

/// Port-keyed pool of publishers and subscribers.
pub struct PubSubPool {
    executor: Arc<PubSubExecutor>,
    publishers: Mutex<HashMap<u16, Publisher>>,
    subscribers: Mutex<HashMap<u16, Subscriber>>,
}

impl PubSubPool {
    /// Create an empty pool running on `executor`.
    #[must_use]
    pub fn new(executor: Arc<PubSubExecutor>) -> Self {
        Self {
            executor,
            publishers: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// The shared executor.
    #[must_use]
    pub fn executor(&self) -> &Arc<PubSubExecutor> {
        &self.executor
    }

    /// Frame `topic` and `payload` and send them on `port`.
    ///
    /// Validation happens before any publisher is created, so a rejected
    /// message never reaches the transport.
    ///
    /// # Errors
    ///
    /// - `INVALID_TOPIC` / `INVALID_PAYLOAD` from [`frame::encode`]
    /// - `UNABLE_TO_SEND` if the frame exceeds [`MAX_FRAME_LEN`], the port
    ///   cannot be bound or the send fails
    pub fn publish(&self, port: u16, topic: &str, payload: &str) -> PublishResult {
        let framed = frame::encode(topic, payload)?;
        self.send(port, framed.as_bytes())
    }

    /// Stamp `payload` with `version`, then [`Self::publish`] it.
    ///
    /// # Errors
    ///
    /// `INVALID_PAYLOAD` from [`frame::stamp_version`], then any error of
    /// [`Self::publish`].
    pub fn publish_json(
        &self,
        port: u16,
        topic: &str,
        payload: &Value,
        version: &str,
    ) -> PublishResult {
        let serialized = frame::stamp_version(payload, version)?;
        self.publish(port, topic, &serialized)
    }

    /// Subscribe to the publisher on `port` of this host with a raw frame
    /// callback.
    ///
    /// # Errors
    ///
    /// `ALREADY_SUBSCRIBED` if `port` already has a subscriber in this pool.
    pub fn subscribe<F>(&self, port: u16, callback: F) -> SubscribeResult
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.lock();
        let Entry::Vacant(entry) = subscribers.entry(port) else {
            return Err(TaggedError::with_detail(
                SubscriberError::AlreadySubscribed,
                format!("Subscribe requested on an already subscribed port ({})", port),
            ));
        };

        let subscriber = Subscriber::new(Arc::clone(&self.executor));
        subscriber.set_callback(callback);
        subscriber.add_session(LOOPBACK_HOST, port);
        entry.insert(subscriber);

        info!(port, "Subscribed");
        Ok(())
    }

    /// Subscribe on `port` and apply the receive protocol for `version`
    /// before invoking `callback`.
    ///
    /// Only frames that decode, parse and carry exactly `version` are
    /// delivered as `Ok`; every other frame is delivered as the error that
    /// rejected it.
    ///
    /// # Errors
    ///
    /// `ALREADY_SUBSCRIBED` if `port` already has a subscriber in this pool.
    pub fn subscribe_json<F>(&self, port: u16, version: &str, callback: F) -> SubscribeResult
    where
        F: Fn(Delivery) + Send + Sync + 'static,
    {
        let version = version.to_owned();
        self.subscribe(port, move |raw| {
            let delivery = frame::decode_message(raw, &version);
            if let Err(e) = &delivery {
                debug!(port, error = %e, "Rejected inbound frame");
            }
            callback(delivery);
        })
    }

    /// Whether a publisher is bound on `port`.
    #[must_use]
    pub fn has_publisher(&self, port: u16) -> bool {
        self.publishers.lock().contains_key(&port)
    }

    /// Whether `port` has a subscriber.
    #[must_use]
    pub fn has_subscriber(&self, port: u16) -> bool {
        self.subscribers.lock().contains_key(&port)
    }

    fn send(&self, port: u16, framed: &[u8]) -> PublishResult {
        if framed.len() > MAX_FRAME_LEN {
            return Err(TaggedError::with_detail(
                PublishError::UnableToSend,
                format!(
                    "Message of {} bytes exceeds the {} byte frame limit",
                    framed.len(),
                    MAX_FRAME_LEN
                ),
            ));
        }

        let mut publishers = self.publishers.lock();
        let publisher = match publishers.entry(port) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let publisher = Publisher::bind(&self.executor, port).map_err(|e| {
                    TaggedError::with_detail(
                        PublishError::UnableToSend,
                        format!("Unable to publish on port {} ({})", port, e),
                    )
                })?;
                info!(port, "Publishing");
                entry.insert(publisher)
            }
        };

        if !publisher.send(framed) {
            return Err(TaggedError::with_detail(
                PublishError::UnableToSend,
                "Error in sending payload",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PubSubPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut publishers: Vec<u16> = self.publishers.lock().keys().copied().collect();
        let mut subscribers: Vec<u16> = self.subscribers.lock().keys().copied().collect();
        publishers.sort_unstable();
        subscribers.sort_unstable();

        f.debug_struct("PubSubPool")
            .field("executor", &self.executor)
            .field("publishers", &publishers)
            .field("subscribers", &subscribers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    fn pool() -> PubSubPool {
        PubSubPool::new(PubSubExecutor::with_threads(2).unwrap())
    }

    #[test]
    fn test_invalid_topic_never_binds() {
        let pool = pool();
        let port = free_port();

        let empty = pool.publish(port, "", "{}").unwrap_err();
        let delimited = pool.publish(port, "a#b", "{}").unwrap_err();

        assert_eq!(empty.kind(), PublishError::InvalidTopic);
        assert_eq!(delimited.kind(), PublishError::InvalidTopic);
        assert!(!pool.has_publisher(port));
    }

    #[test]
    fn test_empty_payload_never_binds() {
        let pool = pool();
        let port = free_port();

        let err = pool.publish(port, "T", "").unwrap_err();

        assert_eq!(err.kind(), PublishError::InvalidPayload);
        assert!(!pool.has_publisher(port));
    }

    #[test]
    fn test_version_field_rejected_before_send() {
        let pool = pool();
        let port = free_port();

        let err = pool
            .publish_json(port, "T", &json!({"version": "x"}), "1.0.0")
            .unwrap_err();

        assert_eq!(err.kind(), PublishError::InvalidPayload);
        assert!(!pool.has_publisher(port));
    }

    #[test]
    fn test_publisher_reused_per_port() {
        let pool = pool();
        let port = free_port();

        pool.publish(port, "T", "{}").unwrap();
        pool.publish(port, "T", "{}").unwrap();

        assert!(pool.has_publisher(port));
        assert_eq!(pool.publishers.lock().len(), 1);
    }

    #[test]
    fn test_busy_port_is_unable_to_send() {
        let pool = pool();
        let blocker = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = blocker.local_addr().unwrap().port();

        let err = pool.publish(port, "T", "{}").unwrap_err();

        assert_eq!(err.kind(), PublishError::UnableToSend);
        assert!(!pool.has_publisher(port), "failed bind must not be cached");
    }

    #[test]
    fn test_second_subscribe_same_port() {
        let pool = pool();
        let port = free_port();

        pool.subscribe(port, |_| {}).unwrap();
        let err = pool.subscribe_json(port, "1.0.0", |_| {}).unwrap_err();

        assert_eq!(err.kind(), SubscriberError::AlreadySubscribed);
        assert!(pool.has_subscriber(port));
    }

    #[test]
    fn test_json_roundtrip_through_loopback() {
        let sender = pool();
        let receiver = pool();
        let port = free_port();

        let (tx, rx) = mpsc::channel();
        receiver
            .subscribe_json(port, "1.0.0", move |delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let delivery = loop {
            sender
                .publish_json(port, "T", &json!({"x": 1}), "1.0.0")
                .unwrap();
            if let Ok(delivery) = rx.recv_timeout(Duration::from_millis(50)) {
                break delivery;
            }
            assert!(Instant::now() < deadline, "nothing delivered");
        };

        let envelope = delivery.unwrap();
        assert_eq!(envelope.topic, "T");
        assert_eq!(envelope.payload, json!({"x": 1, "version": "1.0.0"}));
    }

    #[test]
    fn test_foreign_version_delivered_as_error() {
        let sender = pool();
        let receiver = pool();
        let port = free_port();

        let (tx, rx) = mpsc::channel();
        receiver
            .subscribe_json(port, "1.0.0", move |delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let delivery = loop {
            sender
                .publish_json(port, "T", &json!({"x": 1}), "2.0.0")
                .unwrap();
            if let Ok(delivery) = rx.recv_timeout(Duration::from_millis(50)) {
                break delivery;
            }
            assert!(Instant::now() < deadline, "nothing delivered");
        };

        let err = delivery.unwrap_err();
        assert_eq!(err.kind(), SubscriberError::InvalidPayload);
    }

    #[test]
    fn test_malformed_frame_delivered_as_invalid_topic() {
        let executor = PubSubExecutor::with_threads(2).unwrap();
        let publisher = Publisher::bind(&executor, 0).unwrap();
        let port = publisher.local_addr().port();
        let receiver = pool();

        let (tx, rx) = mpsc::channel();
        receiver
            .subscribe_json(port, "1.0.0", move |delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let delivery = loop {
            assert!(publisher.send(b"no-delimiter"));
            if let Ok(delivery) = rx.recv_timeout(Duration::from_millis(50)) {
                break delivery;
            }
            assert!(Instant::now() < deadline, "nothing delivered");
        };

        assert_eq!(delivery.unwrap_err().kind(), SubscriberError::InvalidTopic);
    }

    #[test]
    fn test_oversized_message_refused_and_sessions_survive() {
        let sender = pool();
        let receiver = pool();
        let port = free_port();

        let (tx, rx) = mpsc::channel();
        receiver
            .subscribe(port, move |frame| {
                let _ = tx.send(frame.len());
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            sender.publish(port, "T", "{}").unwrap();
            if rx.recv_timeout(Duration::from_millis(50)).is_ok() {
                break;
            }
            assert!(Instant::now() < deadline, "nothing delivered");
        }

        let oversized = "x".repeat(MAX_FRAME_LEN);
        let err = sender.publish(port, "T", &oversized).unwrap_err();
        assert_eq!(err.kind(), PublishError::UnableToSend);

        // Earlier small frames may still be in flight.
        sender.publish(port, "T", "{\"x\":1}").unwrap();
        let expected = "T#{\"x\":1}".len();
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let len = rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .expect("session still connected");
            if len == expected {
                break;
            }
        }
    }

    #[test]
    fn test_oversized_message_never_binds() {
        let pool = pool();
        let port = free_port();

        let err = pool.publish(port, "T", &"x".repeat(MAX_FRAME_LEN)).unwrap_err();

        assert_eq!(err.kind(), PublishError::UnableToSend);
        assert!(!pool.has_publisher(port));
    }
}
