// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the event engine
//!
//! Feeds arbitrary bytes through the line reader and engine. Conversion
//! must never panic and must never fail when writing to a `Vec`. Every
//! reported test ends exactly once, and every service message starts a line.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gotc_events::{EngineOptions, EventEngine, convert};

const MESSAGE_START: &str = "##teamcity[";

fuzz_target!(|data: &[u8]| {
    let engine = EventEngine::new(Vec::new(), EngineOptions::with_name_prefix("fuzz"));
    let (out, summary) = convert(data, engine).expect("writing to a Vec cannot fail");

    // Captured output and passthrough are copied verbatim
    if data.windows(MESSAGE_START.len()).any(|w| w == MESSAGE_START.as_bytes()) {
        return;
    }

    let text = String::from_utf8_lossy(&out);
    let finished = text.matches("##teamcity[testFinished").count();
    let ignored = text.matches("##teamcity[testIgnored").count();
    assert_eq!(finished + ignored, summary.total());

    for (idx, _) in text.match_indices(MESSAGE_START) {
        assert!(
            idx == 0 || text.as_bytes()[idx - 1] == b'\n',
            "service message does not start a line at byte {idx}"
        );
    }
});
