// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! TeamCity service message formatting
//!
//! Service messages are single lines of the form
//! `##teamcity[messageName key='value' key='value']`. Attribute values are
//! escaped with [`escape`].

use std::fmt;

use chrono::{Local, NaiveDateTime};

/// Timestamp format expected by TeamCity, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Escape a value for use inside a service message attribute
///
/// Substitutions are applied in a fixed order so that `|` characters
/// introduced by later rules are never escaped twice.
#[must_use]
pub fn escape(value: &str) -> String {
    value
        .replace('|', "||")
        .replace('\n', "|n")
        .replace('\r', "|n")
        .replace('\'', "|'")
        .replace(']', "|]")
        .replace('[', "|[")
}

/// Escape detail lines joined with newlines
#[must_use]
pub fn escape_lines(lines: &[String]) -> String {
    escape(&lines.join("\n"))
}

/// Format a wall clock time as a service message timestamp
#[must_use]
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Source of wall clock time for timestamps
pub trait Clock {
    /// Current local time
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that always returns the same instant, for reproducible output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A single service message under construction
///
/// ```
/// use gotc_events::message::ServiceMessage;
///
/// let msg = ServiceMessage::new("testSuiteStarted").attr("name", "TestA/[x]");
/// assert_eq!(msg.to_string(), "##teamcity[testSuiteStarted name='TestA/|[x|]']");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
}

impl ServiceMessage {
    /// Start a message with the given message name
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    /// Append an attribute; the value is escaped
    #[must_use]
    pub fn attr(mut self, key: &'static str, value: &str) -> Self {
        self.attrs.push((key, escape(value)));
        self
    }

    /// Append an attribute whose value is already escaped
    #[must_use]
    pub fn escaped_attr(mut self, key: &'static str, value: String) -> Self {
        self.attrs.push((key, value));
        self
    }

    /// The message name, e.g. `testStarted`
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }
}

impl fmt::Display for ServiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "##teamcity[{}", self.name)?;
        for (key, value) in &self.attrs {
            write!(f, " {key}='{value}'")?;
        }
        f.write_str("]")
    }
}
