// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Event engine: turns classified `go test` lines into service messages
//!
//! The engine consumes one line at a time. Lines belonging to a test are
//! buffered on that test's [`TestRecord`] until a later start, end or summary
//! line proves the record is complete, at which point it is *finalized*:
//! enclosing suites are closed or opened as needed and the test's messages
//! are written to the sink.
//!
//! Whether a test is a suite is only known once a nested test shows up, so
//! suite messages are decided at finalize time, never when a test starts.
//!
//! # Example
//!
//! ```
//! use gotc_events::engine::{EngineOptions, EventEngine};
//!
//! let mut engine = EventEngine::new(Vec::new(), EngineOptions::default());
//! engine.process_line("=== RUN   TestA\n").unwrap();
//! engine.process_line("--- PASS: TestA (0.01s)\n").unwrap();
//! let (out, summary) = engine.finish().unwrap();
//!
//! let out = String::from_utf8(out).unwrap();
//! assert!(out.contains("testFinished"));
//! assert_eq!(summary.passed, 1);
//! ```

use std::borrow::Cow;
use std::io::Write;

use chrono::TimeDelta;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::classify::{LineKind, classify, parse_duration};
use crate::error::EventsError;
use crate::message::{Clock, ServiceMessage, SystemClock, escape_lines, format_timestamp};
use crate::record::{Outcome, TestRecord, TestStatus, is_within, parent_name};

/// One level of indentation in front of detail lines
pub const DETAIL_INDENT: &str = "\t";

/// Failure message for tests that reported a data race
pub const RACE_MESSAGE: &str = "Race detected!";

/// Failure message for tests that never printed a status line
pub const ABNORMAL_MESSAGE: &str = "Test ended in panic.";

/// Options controlling how events are written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Prepended, with a separating space, to every test name
    pub name_prefix: String,
}

impl EngineOptions {
    /// Options with the given test name prefix
    #[must_use]
    pub fn with_name_prefix(prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: prefix.into(),
        }
    }

    /// Name under which a test is reported
    #[must_use]
    pub fn test_name(&self, name: &str) -> String {
        if self.name_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", self.name_prefix, name)
        }
    }
}

/// Counts of what was reported during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tests reported as passed
    pub passed: usize,
    /// Tests reported as failed by their own status line
    pub failed: usize,
    /// Tests reported as ignored
    pub ignored: usize,
    /// Tests failed because of a data race
    pub races: usize,
    /// Tests that never printed a status line
    pub abnormal: usize,
    /// Suites opened
    pub suites: usize,
}

impl RunSummary {
    /// Total number of test events written
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.ignored + self.races + self.abnormal
    }

    /// Whether any test was reported as failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed + self.races + self.abnormal > 0
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::Race => self.races += 1,
            Outcome::Abnormal => self.abnormal += 1,
        }
    }
}

/// Streaming state machine converting `go test -v` output
#[derive(Debug)]
pub struct EventEngine<W, C = SystemClock> {
    sink: W,
    clock: C,
    options: EngineOptions,
    /// Name of the record receiving output, always a key of `pending`
    current: Option<String>,
    detail_prefix: String,
    pending: IndexMap<String, TestRecord>,
    suites: Vec<String>,
    summary_lines: String,
    summary: RunSummary,
}

impl<W: Write> EventEngine<W> {
    /// Create an engine writing to `sink`, timestamped by the system clock
    pub fn new(sink: W, options: EngineOptions) -> Self {
        Self::with_clock(sink, SystemClock, options)
    }
}

impl<W: Write, C: Clock> EventEngine<W, C> {
    /// Create an engine with an explicit clock
    pub fn with_clock(sink: W, clock: C, options: EngineOptions) -> Self {
        Self {
            sink,
            clock,
            options,
            current: None,
            detail_prefix: DETAIL_INDENT.to_string(),
            pending: IndexMap::new(),
            suites: Vec::new(),
            summary_lines: String::new(),
            summary: RunSummary::default(),
        }
    }

    /// The sink written to so far
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Number of tests seen but not yet reported
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Names of the currently open suites, outermost first
    pub fn open_suites(&self) -> &[String] {
        &self.suites
    }

    /// Process a single line of input, including its trailing newline if any
    ///
    /// A line without a trailing newline is treated as if it had one, so
    /// text copied to the sink never runs into the next service message.
    ///
    /// # Errors
    ///
    /// Returns `EventsError::Io` if writing to the sink fails.
    pub fn process_line(&mut self, line: &str) -> Result<(), EventsError> {
        let line = terminate(line);
        let line = line.as_ref();
        let kind = classify(line);
        trace!(?kind, "classified line");

        if kind.is_boundary() && self.current_record().is_some_and(TestRecord::has_ended) {
            self.finalize_current()?;
        }

        match kind {
            LineKind::Start { name } => {
                self.open_record(name);
                self.current = Some(name.to_string());
            }
            LineKind::End {
                indent,
                status,
                name,
                duration,
            } => self.end_record(indent, status, name, duration),
            LineKind::Summary => self.summary_lines.push_str(line),
            LineKind::RaceWarning => match self.current_record_mut() {
                Some(record) => {
                    debug!(name = %record.name, "data race reported");
                    record.race_detected = true;
                }
                None => self.passthrough(line)?,
            },
            LineKind::Other => self.other_line(line)?,
        }
        Ok(())
    }

    /// Flush everything still pending and return the sink
    ///
    /// The current test is finalized, remaining suites are closed innermost
    /// first, tests that never ended are reported as failures, and the
    /// buffered summary lines are written last.
    ///
    /// # Errors
    ///
    /// Returns `EventsError::Io` if writing to the sink fails.
    pub fn finish(mut self) -> Result<(W, RunSummary), EventsError> {
        self.finalize_current()?;

        while let Some(suite) = self.suites.pop() {
            self.write(&ServiceMessage::new("testSuiteFinished").attr("name", &suite))?;
        }

        let remaining = std::mem::take(&mut self.pending);
        for record in remaining.into_values() {
            self.emit_test(&record)?;
        }

        self.sink.write_all(self.summary_lines.as_bytes())?;
        self.sink.flush()?;
        debug!(summary = ?self.summary, "run complete");
        Ok((self.sink, self.summary))
    }

    fn current_record(&self) -> Option<&TestRecord> {
        self.current.as_deref().and_then(|name| self.pending.get(name))
    }

    fn current_record_mut(&mut self) -> Option<&mut TestRecord> {
        let name = self.current.as_deref()?;
        self.pending.get_mut(name)
    }

    /// Insert a fresh record and mark its pending ancestors as suites
    fn open_record(&mut self, name: &str) {
        let record = TestRecord::new(name, self.clock.now());
        if self.pending.insert(name.to_string(), record).is_some() {
            debug!(name, "test started again before it was reported");
        }

        let mut ancestor = parent_name(name);
        while let Some(parent) = ancestor {
            if let Some(record) = self.pending.get_mut(parent) {
                record.is_suite_parent = true;
            }
            ancestor = parent_name(parent);
        }
    }

    fn end_record(&mut self, indent: &str, status: TestStatus, name: &str, duration: &str) {
        if !self.pending.contains_key(name) {
            warn!(name, "status line without a matching run line");
            self.open_record(name);
        }

        let duration = parse_duration(duration).unwrap_or_else(|| {
            warn!(name, duration, "malformed duration, using zero");
            TimeDelta::zero()
        });

        debug!(name, status = status.as_str(), "status line");
        if let Some(record) = self.pending.get_mut(name) {
            record.status = Some(status);
            record.duration = duration;
        }
        self.detail_prefix = format!("{indent}{DETAIL_INDENT}");
        self.current = Some(name.to_string());
    }

    fn other_line(&mut self, line: &str) -> Result<(), EventsError> {
        if self.current.is_none() {
            return self.passthrough(line);
        }

        let text = trim_newline(line);
        let prefix = self.detail_prefix.as_str();
        if let Some(record) = self
            .current
            .as_deref()
            .and_then(|name| self.pending.get_mut(name))
        {
            match text.strip_prefix(prefix) {
                Some(detail) if record.has_ended() => record.detail_lines.push(detail.to_string()),
                _ => record.captured_output.push_str(line),
            }
        }
        Ok(())
    }

    fn passthrough(&mut self, line: &str) -> Result<(), EventsError> {
        self.sink.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Report the current record, closing and opening suites around it
    fn finalize_current(&mut self) -> Result<(), EventsError> {
        let Some(name) = self.current.take() else {
            return Ok(());
        };
        let Some(record) = self.pending.shift_remove(&name) else {
            return Ok(());
        };
        debug!(name = %record.name, "finalizing test");

        self.close_suites_outside(&record.name)?;
        self.open_enclosing_suites(&record.name)?;
        if record.is_suite_parent && self.suites.last() != Some(&record.name) {
            self.open_suite(&record.name)?;
        }
        self.emit_test(&record)
    }

    fn close_suites_outside(&mut self, name: &str) -> Result<(), EventsError> {
        while let Some(top) = self.suites.last() {
            if is_within(top, name) {
                break;
            }
            if let Some(suite) = self.suites.pop() {
                debug!(suite = %suite, "closing suite");
                self.write(&ServiceMessage::new("testSuiteFinished").attr("name", &suite))?;
            }
        }
        Ok(())
    }

    /// Open suites for ancestors that are still running, outermost first
    ///
    /// Happens when a subtest is reported before its parent's status line.
    fn open_enclosing_suites(&mut self, name: &str) -> Result<(), EventsError> {
        let mut ancestors = Vec::new();
        let mut ancestor = parent_name(name);
        while let Some(parent) = ancestor {
            ancestors.push(parent);
            ancestor = parent_name(parent);
        }

        for parent in ancestors.into_iter().rev() {
            let is_open_suite = self
                .pending
                .get(parent)
                .is_some_and(|record| record.is_suite_parent);
            let deeper_than_top = self
                .suites
                .last()
                .is_none_or(|top| top != parent && is_within(top, parent));
            if is_open_suite && deeper_than_top {
                self.open_suite(parent)?;
            }
        }
        Ok(())
    }

    fn open_suite(&mut self, name: &str) -> Result<(), EventsError> {
        debug!(suite = name, "opening suite");
        self.write(&ServiceMessage::new("testSuiteStarted").attr("name", name))?;
        self.suites.push(name.to_string());
        self.summary.suites += 1;
        Ok(())
    }

    fn emit_test(&mut self, record: &TestRecord) -> Result<(), EventsError> {
        let outcome = record.outcome();
        let name = self.options.test_name(&record.name);
        let now = format_timestamp(&self.clock.now());
        debug!(name = %record.name, ?outcome, "reporting test");

        self.write(
            &ServiceMessage::new("testStarted")
                .attr("timestamp", &format_timestamp(&record.started_at))
                .attr("name", &name)
                .attr("captureStandardOutput", "true"),
        )?;
        self.sink.write_all(record.captured_output.as_bytes())?;

        let failure = match outcome {
            Outcome::Ignored => {
                self.write(
                    &ServiceMessage::new("testIgnored")
                        .attr("timestamp", &now)
                        .attr("name", &name),
                )?;
                self.summary.record(outcome);
                return Ok(());
            }
            Outcome::Passed => None,
            Outcome::Failed => Some(None),
            Outcome::Race => Some(Some(RACE_MESSAGE)),
            Outcome::Abnormal => {
                warn!(name = %record.name, "test ended without a status line");
                Some(Some(ABNORMAL_MESSAGE))
            }
        };

        if let Some(message) = failure {
            let mut failed = ServiceMessage::new("testFailed")
                .attr("timestamp", &now)
                .attr("name", &name);
            if let Some(message) = message {
                failed = failed.attr("message", message);
            }
            self.write(&failed.escaped_attr("details", escape_lines(&record.detail_lines)))?;
        }

        self.write(
            &ServiceMessage::new("testFinished")
                .attr("timestamp", &now)
                .attr("name", &name)
                .attr("duration", &record.duration_ms().to_string()),
        )?;
        self.summary.record(outcome);
        Ok(())
    }

    fn write(&mut self, message: &ServiceMessage) -> Result<(), EventsError> {
        trace!(message = message.name(), "writing service message");
        writeln!(self.sink, "{message}")?;
        Ok(())
    }
}

fn terminate(line: &str) -> Cow<'_, str> {
    if line.ends_with('\n') {
        Cow::Borrowed(line)
    } else {
        Cow::Owned(format!("{line}\n"))
    }
}

fn trim_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
