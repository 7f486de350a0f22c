//! # PubSub Integration
//!
//! Two components exchanging messages through their configured ports.
//!
//! ```text
//! Sender ──publish("T", {"x":1})──→ :Publisher.Sender ──→ Receiver.subscribe("Sender")
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        component, config_file, config_toml, free_port, Probe, PROBE_VERSION, TIMEOUT,
    };
    use component_runtime::{Component, Delivery, PublishError, SubscriberError};
    use serde_json::json;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Start a looping probe named `name` on `config`.
    fn running(name: &str, version: &str, config: &tempfile::NamedTempFile) -> Component<Probe> {
        let mut c = component(Probe::forever(name).with_version(version));
        c.set_configuration_path(config.path());
        assert!(c.start(), "{} failed to start", name);
        c
    }

    /// Publish from `sender` until `rx` yields a delivery.
    fn first_delivery(
        sender: &Component<Probe>,
        rx: &mpsc::Receiver<Delivery>,
        payload: &serde_json::Value,
    ) -> Delivery {
        let deadline = std::time::Instant::now() + TIMEOUT;
        loop {
            sender.publish("T", payload).expect("publish");
            if let Ok(delivery) = rx.recv_timeout(Duration::from_millis(50)) {
                return delivery;
            }
            assert!(std::time::Instant::now() < deadline, "nothing delivered");
        }
    }

    #[test]
    fn test_round_trip_between_components() {
        let port = free_port();
        let sender_config = config_file(&config_toml(PROBE_VERSION, &[("Sender", port)], ""));
        let receiver_config = config_file(&config_toml(PROBE_VERSION, &[("Sender", port)], ""));

        let sender = running("Sender", PROBE_VERSION, &sender_config);
        let receiver = running("Receiver", PROBE_VERSION, &receiver_config);

        let (tx, rx) = mpsc::channel();
        receiver
            .subscribe("Sender", move |delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        let envelope = first_delivery(&sender, &rx, &json!({"x": 1})).unwrap();

        assert_eq!(envelope.topic, "T");
        assert_eq!(envelope.payload, json!({"x": 1, "version": PROBE_VERSION}));
        assert!(sender.stop_blocking());
        assert!(receiver.stop_blocking());
    }

    #[test]
    fn test_version_mismatch_delivered_as_invalid_payload() {
        let port = free_port();
        let sender_config = config_file(&config_toml("2.0.0", &[("Sender", port)], ""));
        let receiver_config = config_file(&config_toml(PROBE_VERSION, &[("Sender", port)], ""));

        let sender = running("Sender", "2.0.0", &sender_config);
        let receiver = running("Receiver", PROBE_VERSION, &receiver_config);

        let (tx, rx) = mpsc::channel();
        receiver
            .subscribe("Sender", move |delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        let err = first_delivery(&sender, &rx, &json!({"x": 1})).unwrap_err();

        assert_eq!(err, SubscriberError::InvalidPayload);
        assert_eq!(
            err.detail(),
            Some("Sender and receiver were on different software version")
        );
    }

    #[test]
    fn test_second_subscription_to_same_component() {
        let port = free_port();
        let config = config_file(&config_toml(PROBE_VERSION, &[("Sender", port)], ""));
        let receiver = running("Receiver", PROBE_VERSION, &config);

        receiver.subscribe("Sender", |_| {}).unwrap();
        let err = receiver.subscribe("Sender", |_| {}).unwrap_err();

        assert_eq!(err, SubscriberError::AlreadySubscribed);
    }

    #[test]
    fn test_subscribe_to_unknown_component() {
        let config = config_file(&config_toml(PROBE_VERSION, &[], ""));
        let receiver = running("Receiver", PROBE_VERSION, &config);

        let err = receiver.subscribe("Nobody", |_| {}).unwrap_err();

        assert_eq!(err, SubscriberError::NetworkConfigurationMissing);
    }

    #[test]
    fn test_publish_validation_errors() {
        let port = free_port();
        let config = config_file(&config_toml(PROBE_VERSION, &[("Sender", port)], ""));
        let sender = running("Sender", PROBE_VERSION, &config);

        let empty_topic = sender.publish("", &json!({"x": 1})).unwrap_err();
        let delimited = sender.publish("A#B", &json!({"x": 1})).unwrap_err();
        let reserved = sender.publish("T", &json!({"version": "1.0.0"})).unwrap_err();
        let not_object = sender.publish("T", &json!("text")).unwrap_err();

        assert_eq!(empty_topic, PublishError::InvalidTopic);
        assert_eq!(delimited, PublishError::InvalidTopic);
        assert_eq!(reserved, PublishError::InvalidPayload);
        assert_eq!(not_object, PublishError::InvalidPayload);
        assert!(sender.publish("T", &json!({"x": 1})).is_ok());
    }

    #[test]
    fn test_publish_without_own_port() {
        let config = config_file(&config_toml(PROBE_VERSION, &[("Other", free_port())], ""));
        let sender = running("Sender", PROBE_VERSION, &config);

        let err = sender.publish("T", &json!({"x": 1})).unwrap_err();

        assert_eq!(err, PublishError::NetworkConfigurationMissing);
    }

    #[test]
    fn test_temperature_component_feeds_subscriber() {
        use grow_components::{SimulatedThermometer, Temperature};

        let mut temperature = Component::with_executor(
            Temperature::with_thermometer(Box::new(SimulatedThermometer::with_seed(3))),
            component_runtime::PubSubExecutor::with_threads(2).unwrap(),
        );
        let version = temperature.version().to_owned();

        let port = free_port();
        let config = config_file(&config_toml(
            &version,
            &[("Temperature", port)],
            "[Temperature]\npoll_time = 10\n",
        ));
        temperature.set_configuration_path(config.path());

        let listener = running("Listener", &version, &config);
        let (tx, rx) = mpsc::channel();
        listener
            .subscribe("Temperature", move |delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        assert!(temperature.start());
        let envelope = rx.recv_timeout(TIMEOUT).expect("reading").unwrap();
        assert!(temperature.stop_blocking());

        assert_eq!(envelope.topic, "TEMPERATURE");
        assert!(envelope.payload["temperature"].as_f64().is_some_and(f64::is_finite));
        assert_eq!(envelope.payload["version"], version.as_str());
    }
}
