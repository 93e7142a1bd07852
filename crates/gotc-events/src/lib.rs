// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gotc-events: `go test` output to TeamCity service messages
//!
//! This library crate converts the line-oriented console output of
//! `go test -v` into TeamCity service messages in a single streaming pass.
//! Subtests (`TestA/case`) are grouped into suites, output printed by a test
//! is attached to it, and indented lines after a `--- FAIL` become the
//! failure details.
//!
//! # Example
//!
//! ```no_run
//! use gotc_events::{EngineOptions, EventEngine, convert};
//!
//! let stdin = std::io::stdin().lock();
//! let engine = EventEngine::new(std::io::stdout(), EngineOptions::default());
//! let (_stdout, summary) = convert(stdin, engine).unwrap();
//! println!("{} tests reported", summary.total());
//! ```

pub mod classify;
pub mod engine;
pub mod error;
pub mod message;
pub mod record;
pub mod stream;

pub use classify::{LineKind, classify, parse_duration};
pub use engine::{EngineOptions, EventEngine, RunSummary};
pub use error::EventsError;
pub use message::{Clock, FixedClock, ServiceMessage, SystemClock, escape};
pub use record::{Outcome, TestRecord, TestStatus};
pub use stream::convert;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::engine::{EngineOptions, EventEngine, RunSummary};
    pub use crate::error::EventsError;
    pub use crate::stream::convert;
}
