// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Driving an [`EventEngine`] from a byte source
//!
//! Input is read line by line as raw bytes and decoded lossily, so invalid
//! UTF-8 in test output never stops the conversion. A read error is treated
//! exactly like the end of input: whatever is pending gets flushed.

use std::io::{BufRead, ErrorKind, Write};

use tracing::{debug, warn};

use crate::engine::{EventEngine, RunSummary};
use crate::error::EventsError;
use crate::message::Clock;

/// Feed every line of `reader` through `engine`, then flush it
///
/// A final line without a trailing newline is processed as if it had one.
///
/// # Errors
///
/// Returns `EventsError::Io` if writing to the engine's sink fails.
/// Read failures end the input and are only logged.
pub fn convert<R, W, C>(
    mut reader: R,
    mut engine: EventEngine<W, C>,
) -> Result<(W, RunSummary), EventsError>
where
    R: BufRead,
    W: Write,
    C: Clock,
{
    let mut buf = Vec::new();
    let mut lines = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                lines += 1;
                engine.process_line(&String::from_utf8_lossy(&buf))?;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(error = %e, lines, "read failed, treating as end of input");
                break;
            }
        }
    }

    debug!(lines, "input exhausted");
    engine.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOptions;
    use crate::message::FixedClock;
    use chrono::NaiveDate;
    use std::io::{self, BufReader, Read};

    fn engine() -> EventEngine<Vec<u8>, FixedClock> {
        let time = NaiveDate::from_ymd_opt(2026, 1, 17)
            .and_then(|d| d.and_hms_opt(2, 33, 6))
            .expect("valid date");
        EventEngine::with_clock(Vec::new(), FixedClock(time), EngineOptions::default())
    }

    /// Yields its data, then fails every read
    struct FailingReader {
        data: &'static [u8],
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("connection reset"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_convert_plain_input() {
        let input = "=== RUN TestA\n--- PASS: TestA (0.00s)\nPASS\n";
        let (out, summary) = convert(input.as_bytes(), engine()).expect("convert");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.ends_with("PASS\n"));
        assert_eq!(summary.passed, 1);
    }

    #[test]
    fn test_convert_last_line_without_newline() {
        let input = "=== RUN TestA\n--- FAIL: TestA (0.00s)\n\tboom";
        let (out, summary) = convert(input.as_bytes(), engine()).expect("convert");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("details='boom'"));
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_convert_crash_output_without_newline() {
        let (out, summary) =
            convert("=== RUN TestA
panic: boom".as_bytes(), engine()).expect("convert");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("panic: boom\n##teamcity[testFailed "));
        assert!(out.lines().all(|l| !l.contains("##teamcity[") || l.starts_with("##teamcity[")));
        assert_eq!(summary.abnormal, 1);
    }

    #[test]
    fn test_convert_read_error_flushes_pending() {
        let reader = BufReader::new(FailingReader {
            data: b"=== RUN TestA\nhalf written output\n",
        });
        let (out, summary) = convert(reader, engine()).expect("convert");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("half written output\n"));
        assert!(out.contains("message='Test ended in panic.'"));
        assert_eq!(summary.abnormal, 1);
    }

    #[test]
    fn test_convert_invalid_utf8_passes_through_lossily() {
        let input: &[u8] = b"\xffbuild noise\n=== RUN TestA\n--- PASS: TestA (0.00s)\n";
        let (out, summary) = convert(input, engine()).expect("convert");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.starts_with("\u{fffd}build noise\n"));
        assert_eq!(summary.passed, 1);
    }
}
