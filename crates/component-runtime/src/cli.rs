//! Command line surface shared by every component binary.

use clap::{CommandFactory, FromArgMatches, Parser};
use grow_telemetry::LogLevel;
use std::ffi::OsString;
use std::path::PathBuf;

/// Options understood by every component.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Path of the configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error, critical, off)
    #[arg(short, long, default_value = "info")]
    pub loglevel: LogLevel,
}

impl CommandLine {
    /// Parse `args` (program name first) for the component `name`.
    ///
    /// # Errors
    ///
    /// The `clap` error for `--help` or invalid input; printing it shows
    /// the help or the usage.
    pub fn try_parse_for<I, T>(name: &str, description: &str, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command()
            .bin_name(name.to_owned())
            .about(description.to_owned());
        let matches = command.try_get_matches_from_mut(args)?;
        Self::from_arg_matches(&matches).map_err(|e| e.with_cmd(&command))
    }
}
