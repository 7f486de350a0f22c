//! # Error Types
//!
//! Defines the error kinds used across the component harness and the
//! generic [`TaggedError`] that carries one of them.
//!
//! Every recoverable failure in the harness is reported as
//! `Result<T, TaggedError<K>>` where `K` is one of the kind enums below.
//! Collaborator failures (file I/O, TOML or JSON parse errors, socket errors)
//! are translated into a kind at the crate boundary and their message is kept
//! as the detail text.

use std::fmt;
use thiserror::Error;

/// Symbolic name of an error kind.
///
/// Mirrors the enum variant in SCREAMING_SNAKE_CASE so log lines read the
/// same regardless of the `Display` wording.
pub trait ErrorKind: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The symbolic name of this kind, e.g. `INVALID_TOPIC`.
    fn as_str(&self) -> &'static str;
}

/// An error kind plus optional human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedError<K: ErrorKind> {
    kind: K,
    detail: Option<String>,
}

impl<K: ErrorKind> TaggedError<K> {
    /// Create an error carrying only its kind.
    #[must_use]
    pub fn new(kind: K) -> Self {
        Self { kind, detail: None }
    }

    /// Create an error with further information attached.
    #[must_use]
    pub fn with_detail(kind: K, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    /// The error kind.
    #[must_use]
    pub fn kind(&self) -> K {
        self.kind
    }

    /// Further information, if any was attached.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Symbolic name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.kind.as_str()
    }
}

impl<K: ErrorKind> From<K> for TaggedError<K> {
    fn from(kind: K) -> Self {
        Self::new(kind)
    }
}

impl<K: ErrorKind> PartialEq<K> for TaggedError<K> {
    fn eq(&self, other: &K) -> bool {
        self.kind == *other
    }
}

impl<K: ErrorKind> fmt::Display for TaggedError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.kind.as_str(), detail),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl<K: ErrorKind> std::error::Error for TaggedError<K> {}

/// Failures of the publishing side of the pub/sub layer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishError {
    /// The transport refused or failed to send the frame.
    #[error("unable to send")]
    UnableToSend,

    /// No `Publisher.<name>` port is configured for the sender.
    #[error("network configuration missing")]
    NetworkConfigurationMissing,

    /// Topic is empty or contains the frame delimiter.
    #[error("invalid topic")]
    InvalidTopic,

    /// Payload is empty, reserved-field tainted or not serializable.
    #[error("invalid payload")]
    InvalidPayload,
}

impl ErrorKind for PublishError {
    fn as_str(&self) -> &'static str {
        match self {
            Self::UnableToSend => "UNABLE_TO_SEND",
            Self::NetworkConfigurationMissing => "NETWORK_CONFIGURATION_MISSING",
            Self::InvalidTopic => "INVALID_TOPIC",
            Self::InvalidPayload => "INVALID_PAYLOAD",
        }
    }
}

/// Failures of the subscribing side of the pub/sub layer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberError {
    /// No `Publisher.<name>` port is configured for the target component.
    #[error("network configuration missing")]
    NetworkConfigurationMissing,

    /// A received frame had no topic.
    #[error("invalid topic")]
    InvalidTopic,

    /// A received frame had no payload, unparsable JSON or a foreign version.
    #[error("invalid payload")]
    InvalidPayload,

    /// The resolved port already has a subscriber in this process.
    #[error("already subscribed")]
    AlreadySubscribed,
}

impl ErrorKind for SubscriberError {
    fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkConfigurationMissing => "NETWORK_CONFIGURATION_MISSING",
            Self::InvalidTopic => "INVALID_TOPIC",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::AlreadySubscribed => "ALREADY_SUBSCRIBED",
        }
    }
}

/// Failures of the configuration store.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationError {
    /// The file could not be read.
    #[error("unable to load file")]
    UnableToLoadFile,

    /// The file was read but is not valid configuration syntax.
    #[error("unable to parse file")]
    UnableToParseFile,

    /// The store could not be written back to disk.
    #[error("unable to write file")]
    UnableToWriteFile,

    /// No setting exists at the requested path.
    #[error("setting not found")]
    SettingNotFound,

    /// The setting exists but holds a different type.
    #[error("setting type mismatch")]
    SettingTypeMismatch,
}

impl ErrorKind for ConfigurationError {
    fn as_str(&self) -> &'static str {
        match self {
            Self::UnableToLoadFile => "UNABLE_TO_LOAD_FILE",
            Self::UnableToParseFile => "UNABLE_TO_PARSE_FILE",
            Self::UnableToWriteFile => "UNABLE_TO_WRITE_FILE",
            Self::SettingNotFound => "SETTING_NOT_FOUND",
            Self::SettingTypeMismatch => "SETTING_TYPE_MISMATCH",
        }
    }
}

/// Result of a publish operation.
pub type PublishResult = Result<(), TaggedError<PublishError>>;

/// Result of a subscribe operation.
pub type SubscribeResult = Result<(), TaggedError<SubscriberError>>;

/// Result of a configuration operation.
pub type ConfigurationResult<T = ()> = Result<T, TaggedError<ConfigurationError>>;
