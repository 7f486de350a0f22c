//! # Message Framing
//!
//! One transport send carries one message:
//!
//! ```text
//! <topic>#<json-payload-with-version-field>
//! ```
//!
//! The topic is non-empty and never contains the delimiter. The payload is a
//! JSON object stamped with the sender's software version under the reserved
//! `version` field; receivers drop frames stamped with any other version.

use serde_json::{Map, Value};
use shared_types::{PublishError, SubscriberError, TaggedError};

/// Separates the topic from the payload on the wire.
pub const TOPIC_DELIMITER: char = '#';

/// Reserved payload field carrying the sender's software version.
pub const VERSION_FIELD: &str = "version";

/// A fully validated inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Topic the message was published under.
    pub topic: String,
    /// Parsed payload, `version` field included.
    pub payload: Value,
}

/// Build the wire frame for `topic` and an already serialized payload.
///
/// # Errors
///
/// - `INVALID_TOPIC` if the topic is empty or contains [`TOPIC_DELIMITER`]
/// - `INVALID_PAYLOAD` if the payload is empty
pub fn encode(topic: &str, payload: &str) -> Result<String, TaggedError<PublishError>> {
    if topic.is_empty() {
        return Err(TaggedError::with_detail(
            PublishError::InvalidTopic,
            "Trying to publish with empty topic",
        ));
    }

    if topic.contains(TOPIC_DELIMITER) {
        return Err(TaggedError::with_detail(
            PublishError::InvalidTopic,
            "Topic contains invalid character",
        ));
    }

    if payload.is_empty() {
        return Err(TaggedError::with_detail(
            PublishError::InvalidPayload,
            "Trying to publish with empty payload",
        ));
    }

    let mut frame = String::with_capacity(topic.len() + 1 + payload.len());
    frame.push_str(topic);
    frame.push(TOPIC_DELIMITER);
    frame.push_str(payload);
    Ok(frame)
}

/// Split a received frame into topic and payload text.
///
/// # Errors
///
/// - `INVALID_TOPIC` if the delimiter is absent or first, or the topic is
///   not UTF-8
/// - `INVALID_PAYLOAD` if nothing follows the delimiter or the payload is
///   not UTF-8
pub fn decode(frame: &[u8]) -> Result<(&str, &str), TaggedError<SubscriberError>> {
    let delimiter = TOPIC_DELIMITER as u8;
    let position = match frame.iter().position(|byte| *byte == delimiter) {
        Some(position) if position > 0 => position,
        _ => {
            return Err(TaggedError::with_detail(
                SubscriberError::InvalidTopic,
                "Message received with empty topic",
            ))
        }
    };

    if position + 1 == frame.len() {
        return Err(TaggedError::with_detail(
            SubscriberError::InvalidPayload,
            "Message received with empty payload",
        ));
    }

    let topic = std::str::from_utf8(&frame[..position]).map_err(|_| {
        TaggedError::with_detail(SubscriberError::InvalidTopic, "Topic is not valid UTF-8")
    })?;
    let payload = std::str::from_utf8(&frame[position + 1..]).map_err(|_| {
        TaggedError::with_detail(SubscriberError::InvalidPayload, "Payload is not valid UTF-8")
    })?;

    Ok((topic, payload))
}

/// Serialize `payload` with the reserved version field set to `version`.
///
/// A JSON `null` is treated as the empty object.
///
/// # Errors
///
/// `INVALID_PAYLOAD` if the payload is not an object, already carries
/// [`VERSION_FIELD`], or cannot be serialized.
pub fn stamp_version(payload: &Value, version: &str) -> Result<String, TaggedError<PublishError>> {
    let mut stamped = match payload {
        Value::Object(map) if map.contains_key(VERSION_FIELD) => {
            return Err(TaggedError::with_detail(
                PublishError::InvalidPayload,
                "Json payload contains invalid field",
            ))
        }
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => {
            return Err(TaggedError::with_detail(
                PublishError::InvalidPayload,
                "Json payload must be an object",
            ))
        }
    };
    stamped.insert(VERSION_FIELD.to_owned(), Value::String(version.to_owned()));

    serde_json::to_string(&Value::Object(stamped)).map_err(|e| {
        TaggedError::with_detail(
            PublishError::InvalidPayload,
            format!("Failed to serialize json ({})", e),
        )
    })
}

/// Parse payload text and accept it only if it was stamped with `version`.
///
/// # Errors
///
/// `INVALID_PAYLOAD` if the text is not JSON or its version field is
/// missing, not a string, or different from `version`.
pub fn check_version(payload: &str, version: &str) -> Result<Value, TaggedError<SubscriberError>> {
    let parsed: Value = serde_json::from_str(payload).map_err(|e| {
        TaggedError::with_detail(
            SubscriberError::InvalidPayload,
            format!("Failed to parse json ({})", e),
        )
    })?;

    match parsed.get(VERSION_FIELD).and_then(Value::as_str) {
        Some(sender_version) if sender_version == version => Ok(parsed),
        _ => Err(TaggedError::with_detail(
            SubscriberError::InvalidPayload,
            "Sender and receiver were on different software version",
        )),
    }
}

/// Apply the whole receive protocol to one frame.
///
/// # Errors
///
/// Any error of [`decode`] or [`check_version`].
pub fn decode_message(
    frame: &[u8],
    version: &str,
) -> Result<Envelope, TaggedError<SubscriberError>> {
    let (topic, payload) = decode(frame)?;
    let payload = check_version(payload, version)?;
    Ok(Envelope {
        topic: topic.to_owned(),
        payload,
    })
}
