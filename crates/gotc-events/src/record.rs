// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test record types

use chrono::{NaiveDateTime, TimeDelta};

/// Status reported by a `--- PASS|FAIL|SKIP` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    /// Test passed
    Pass,
    /// Test failed
    Fail,
    /// Test was skipped
    Skip,
}

impl TestStatus {
    /// Parse the keyword used by `go test` status lines
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "PASS" => Some(Self::Pass),
            "FAIL" => Some(Self::Fail),
            "SKIP" => Some(Self::Skip),
            _ => None,
        }
    }

    /// The keyword as printed by `go test`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

/// How a record is reported once it is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Passed without a data race
    Passed,
    /// Failed by its own status line
    Failed,
    /// Skipped; reported as ignored with no finish event
    Ignored,
    /// A data race was reported while the test was running
    Race,
    /// Never received a status line
    Abnormal,
}

/// One test (or subtest) observed in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    /// Hierarchical name, components separated by `/`
    pub name: String,
    /// Wall clock time at which the test was first observed
    pub started_at: NaiveDateTime,
    /// Raw output printed by the test before its status line
    pub captured_output: String,
    /// Indented lines following the status line, prefix stripped
    pub detail_lines: Vec<String>,
    /// Elapsed time from the status line
    pub duration: TimeDelta,
    /// Status from the status line, `None` until one is seen
    pub status: Option<TestStatus>,
    /// Set when `WARNING: DATA RACE` was printed while this test was current
    pub race_detected: bool,
    /// Set once another record nested under this name appears
    pub is_suite_parent: bool,
}

impl TestRecord {
    /// Create a record with no output and no status
    #[must_use]
    pub fn new(name: impl Into<String>, started_at: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            started_at,
            captured_output: String::new(),
            detail_lines: Vec::new(),
            duration: TimeDelta::zero(),
            status: None,
            race_detected: false,
            is_suite_parent: false,
        }
    }

    /// Whether a status line has been seen for this record
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.status.is_some()
    }

    /// Decide how the record is reported
    ///
    /// A skip wins over everything, then a data race, then the status itself.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self.status {
            Some(TestStatus::Skip) => Outcome::Ignored,
            _ if self.race_detected => Outcome::Race,
            Some(TestStatus::Pass) => Outcome::Passed,
            Some(TestStatus::Fail) => Outcome::Failed,
            None => Outcome::Abnormal,
        }
    }

    /// Duration in whole milliseconds, truncated toward zero
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.duration.num_milliseconds()
    }
}

/// Parent name of a hierarchical test name, if any
///
/// `TestA/Sub/Leaf` has parent `TestA/Sub`; `TestA` has none.
#[must_use]
pub fn parent_name(name: &str) -> Option<&str> {
    name.rfind('/').map(|idx| &name[..idx])
}

/// Whether `suite` is `name` itself or one of its hierarchical ancestors
#[must_use]
pub fn is_within(suite: &str, name: &str) -> bool {
    name.strip_prefix(suite)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 17)
            .and_then(|d| d.and_hms_milli_opt(2, 33, 6, 0))
            .expect("valid date")
    }

    fn record(status: Option<TestStatus>, race: bool) -> TestRecord {
        TestRecord {
            status,
            race_detected: race,
            ..TestRecord::new("TestA", epoch())
        }
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(record(Some(TestStatus::Pass), false).outcome(), Outcome::Passed);
        assert_eq!(record(Some(TestStatus::Fail), false).outcome(), Outcome::Failed);
        assert_eq!(record(Some(TestStatus::Skip), false).outcome(), Outcome::Ignored);
        assert_eq!(record(None, false).outcome(), Outcome::Abnormal);
    }

    #[test]
    fn test_race_overrides_pass_and_fail() {
        assert_eq!(record(Some(TestStatus::Pass), true).outcome(), Outcome::Race);
        assert_eq!(record(Some(TestStatus::Fail), true).outcome(), Outcome::Race);
        assert_eq!(record(None, true).outcome(), Outcome::Race);
    }

    #[test]
    fn test_skip_wins_over_race() {
        assert_eq!(record(Some(TestStatus::Skip), true).outcome(), Outcome::Ignored);
    }

    #[test]
    fn test_status_keywords() {
        for status in [TestStatus::Pass, TestStatus::Fail, TestStatus::Skip] {
            assert_eq!(TestStatus::from_keyword(status.as_str()), Some(status));
        }
        assert_eq!(TestStatus::from_keyword("ok"), None);
    }

    #[test]
    fn test_duration_ms_truncates_toward_zero() {
        let mut r = record(Some(TestStatus::Pass), false);
        r.duration = TimeDelta::microseconds(1_999);
        assert_eq!(r.duration_ms(), 1);
        r.duration = TimeDelta::microseconds(-1_999);
        assert_eq!(r.duration_ms(), -1);
    }

    #[test]
    fn test_parent_name() {
        assert_eq!(parent_name("TestA/Sub/Leaf"), Some("TestA/Sub"));
        assert_eq!(parent_name("TestA/Sub"), Some("TestA"));
        assert_eq!(parent_name("TestA"), None);
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("TestA", "TestA"));
        assert!(is_within("TestA", "TestA/Sub"));
        assert!(is_within("TestA", "TestA/Sub/Leaf"));
        assert!(!is_within("TestA", "TestAB"));
        assert!(!is_within("TestA/Sub", "TestA"));
    }
}
