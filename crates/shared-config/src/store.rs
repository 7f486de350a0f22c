//! TOML-backed configuration store.
//!
//! # Config File Format
//!
//! ```toml
//! project_version = "0.1.0"
//!
//! [Publisher]
//! Temperature = 7000
//!
//! [Temperature]
//! poll_time = 500
//! ```
//!
//! Settings are addressed by dotted paths: `Publisher.Temperature`,
//! `Temperature.poll_time`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{ConfigurationError, ConfigurationResult, TaggedError};
use std::fs;
use std::path::Path;
use toml::{Table, Value};
use tracing::debug;

/// Separator between the segments of a setting path.
pub const PATH_SEPARATOR: char = '.';

/// A namespaced key/value store loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    root: Table,
}

impl Configuration {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store contents with the file at `path`.
    ///
    /// The store is cleared first, so a failed load leaves it empty.
    ///
    /// # Errors
    ///
    /// - `UNABLE_TO_LOAD_FILE` if the file cannot be read
    /// - `UNABLE_TO_PARSE_FILE` if it is not valid TOML
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> ConfigurationResult {
        let path = path.as_ref();
        self.root.clear();

        let content = fs::read_to_string(path).map_err(|e| {
            TaggedError::with_detail(
                ConfigurationError::UnableToLoadFile,
                format!("Unable to load file at {} ({})", path.display(), e),
            )
        })?;

        self.root = parse_table(&content).map_err(|e| {
            TaggedError::with_detail(
                ConfigurationError::UnableToParseFile,
                format!("Unable to parse file at {} ({})", path.display(), e),
            )
        })?;

        debug!(path = %path.display(), settings = self.root.len(), "Configuration loaded");
        Ok(())
    }

    /// Replace the store contents with `content`.
    ///
    /// # Errors
    ///
    /// `UNABLE_TO_PARSE_FILE` if `content` is not valid TOML.
    pub fn load_from_str(&mut self, content: &str) -> ConfigurationResult {
        self.root.clear();
        self.root = parse_table(content).map_err(|e| {
            TaggedError::with_detail(ConfigurationError::UnableToParseFile, e.to_string())
        })?;
        Ok(())
    }

    /// Write the store to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// `UNABLE_TO_WRITE_FILE` if serialization or the write fails.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> ConfigurationResult {
        let path = path.as_ref();
        let unable_to_write = |e: &dyn std::fmt::Display| {
            TaggedError::with_detail(
                ConfigurationError::UnableToWriteFile,
                format!("Unable to write file at {} ({})", path.display(), e),
            )
        };

        let content = toml::to_string(&self.root).map_err(|e| unable_to_write(&e))?;
        fs::write(path, content).map_err(|e| unable_to_write(&e))
    }

    /// Whether a setting exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Typed lookup of the setting at `path`.
    ///
    /// Returns `None` when the path is absent or the stored value cannot be
    /// represented as `T` (including out-of-range integers).
    #[must_use]
    pub fn setting_value<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.lookup(path)?.clone().try_into().ok()
    }

    /// Overwrite an existing setting.
    ///
    /// # Errors
    ///
    /// - `SETTING_NOT_FOUND` if nothing is stored at `path`
    /// - `SETTING_TYPE_MISMATCH` if `value` is of a different type than the
    ///   stored setting
    pub fn set_value<T: Serialize>(&mut self, path: &str, value: T) -> ConfigurationResult {
        let not_found = || {
            TaggedError::with_detail(
                ConfigurationError::SettingNotFound,
                format!("Setting not found at {}", path),
            )
        };
        let mismatch = || {
            TaggedError::with_detail(
                ConfigurationError::SettingTypeMismatch,
                format!("Setting type mismatch at {}", path),
            )
        };

        let new_value = Value::try_from(value).map_err(|_| mismatch())?;
        let setting = self.lookup_mut(path).ok_or_else(not_found)?;

        if setting.type_str() != new_value.type_str() {
            return Err(mismatch());
        }

        *setting = new_value;
        Ok(())
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the store holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(PATH_SEPARATOR);
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    fn lookup_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split(PATH_SEPARATOR);
        let mut current = self.root.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_table_mut()?.get_mut(segment)?;
        }
        Some(current)
    }
}

fn parse_table(content: &str) -> Result<Table, toml::de::Error> {
    toml::from_str(content)
}
