// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the gotc command line tool
//!
//! This module provides the command line options, their mapping onto
//! [`EngineOptions`], and the logging level selection.

use std::path::PathBuf;

use clap::Parser;
use gotc_events::EngineOptions;

/// gotc - convert `go test -v` output into TeamCity service messages
///
/// Reads the test log from stdin (or --input) and writes service messages
/// to stdout (or --output). Lines that do not belong to any test are passed
/// through unchanged.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gotc")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Prefix added to every test name
    ///
    /// Separated from the test name by a single space. Useful to tell apart
    /// tests of several packages or build configurations in one report.
    #[arg(short, long, env = "GOTC_NAME", default_value = "")]
    pub name: String,

    /// Read the test log from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write service messages to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with service messages.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Options for the event engine
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::with_name_prefix(self.name.clone())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the input path is specified but doesn't exist or
    /// is not a regular file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.name.is_empty());
        assert!(config.input.is_none());
        assert!(config.output.is_none());
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_engine_options_default() {
        assert_eq!(Config::default().engine_options(), EngineOptions::default());
    }

    #[test]
    fn test_engine_options_prefix() {
        let config = Config {
            name: "linux-amd64".to_string(),
            ..Default::default()
        };
        assert_eq!(config.engine_options().test_name("TestA"), "linux-amd64 TestA");
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_log_level_verbose_wins_over_quiet() {
        let config = Config {
            verbose: true,
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_validate_no_input() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_nonexistent_input() {
        let config = Config {
            input: Some(PathBuf::from("/nonexistent/path/12345/go-test.log")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFound(_))));
    }

    #[test]
    fn test_validate_directory_input() {
        let config = Config {
            input: Some(std::env::temp_dir()),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFile(_))));
    }
}
