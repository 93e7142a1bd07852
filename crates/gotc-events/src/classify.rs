// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line classification for `go test -v` output
//!
//! Every input line is matched against a fixed, ordered set of anchored
//! patterns. The first pattern that matches decides the [`LineKind`]:
//!
//! 1. `=== RUN   TestName` starts a test
//! 2. `--- PASS|FAIL|SKIP: TestName (0.01s)` ends a test, possibly indented
//! 3. `ok`, `PASS`, `FAIL`, `exit status`, `Found` are package summary lines
//! 4. `WARNING: DATA RACE` flags the current test
//! 5. anything else is [`LineKind::Other`]
//!
//! Whether an `Other` line is detail text, captured output or passthrough
//! depends on engine state, so that decision is left to the engine.

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use crate::record::TestStatus;

// Whitespace is ASCII only, as printed by `go test`
static RUN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^=== RUN[\t\n\f\r ]+([a-zA-Z_][^\t\n\f\r ]*)").expect("run pattern is valid")
});

static END_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([\t\n\f\r ]*)--- (PASS|SKIP|FAIL):[\t\n\f\r ]+([a-zA-Z_][^\t\n\f\r ]*) \((-?[.0-9s]+)\)",
    )
    .expect("end pattern is valid")
});

static SUMMARY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ok|PASS|FAIL|exit status|Found)").expect("summary pattern is valid")
});

const RACE_WARNING: &str = "WARNING: DATA RACE";

/// Classification of a single input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `=== RUN` line
    Start {
        /// Test name
        name: &'a str,
    },
    /// `--- PASS|FAIL|SKIP` line
    End {
        /// Leading whitespace before `---`
        indent: &'a str,
        /// Reported status
        status: TestStatus,
        /// Test name
        name: &'a str,
        /// Raw duration text, e.g. `0.01s`
        duration: &'a str,
    },
    /// Package level verdict, replayed at the very end of the output
    Summary,
    /// Data race report from the race detector
    RaceWarning,
    /// Any other line
    Other,
}

impl LineKind<'_> {
    /// Start, end and summary lines close the test that has already ended
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Start { .. } | Self::End { .. } | Self::Summary)
    }
}

/// Classify one line of `go test` output
///
/// The trailing newline, if present, is ignored by every pattern.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = RUN_LINE.captures(line) {
        if let Some(name) = caps.get(1) {
            return LineKind::Start {
                name: name.as_str(),
            };
        }
    }

    if let Some(caps) = END_LINE.captures(line) {
        let status = caps
            .get(2)
            .and_then(|m| TestStatus::from_keyword(m.as_str()));
        if let (Some(indent), Some(status), Some(name), Some(duration)) =
            (caps.get(1), status, caps.get(3), caps.get(4))
        {
            return LineKind::End {
                indent: indent.as_str(),
                status,
                name: name.as_str(),
                duration: duration.as_str(),
            };
        }
    }

    if SUMMARY_LINE.is_match(line) {
        return LineKind::Summary;
    }

    if line.starts_with(RACE_WARNING) {
        return LineKind::RaceWarning;
    }

    LineKind::Other
}

/// Parse a `go test` duration such as `0.01s`, `-1.5s` or `0`
///
/// Only the characters admitted by the status line pattern are understood:
/// an optional sign followed by one or more `<decimal>s` terms.
/// Returns `None` for anything else.
#[must_use]
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, mut rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if rest == "0" {
        return Some(TimeDelta::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let mut total_nanos: i64 = 0;
    while !rest.is_empty() {
        let unit = rest.find('s')?;
        let term = &rest[..unit];
        rest = &rest[unit + 1..];
        total_nanos = total_nanos.checked_add(seconds_to_nanos(term)?)?;
    }

    let nanos = if negative { -total_nanos } else { total_nanos };
    Some(TimeDelta::nanoseconds(nanos))
}

/// Convert a decimal number of seconds into nanoseconds without going
/// through floating point
fn seconds_to_nanos(term: &str) -> Option<i64> {
    let (whole, frac) = term.split_once('.').unwrap_or((term, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(1_000_000_000)?;

    let mut scale = 100_000_000;
    for digit in frac.bytes().take(9) {
        nanos = nanos.checked_add(i64::from(digit - b'0') * scale)?;
        scale /= 10;
    }
    Some(nanos)
}
