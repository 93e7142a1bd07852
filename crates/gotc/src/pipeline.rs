// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Wiring configured input and output to the converter

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::Context;
use gotc_events::{EventEngine, RunSummary, convert};
use tracing::{debug, info};

use crate::config::Config;

/// Convert the configured input and write service messages to the configured output
///
/// # Errors
///
/// Returns an error if the input or output file cannot be opened, or if
/// writing service messages fails.
pub fn run(config: &Config) -> anyhow::Result<RunSummary> {
    let reader = open_input(config)?;
    let writer = open_output(config)?;

    let engine = EventEngine::new(writer, config.engine_options());
    let (mut writer, summary) = convert(reader, engine).context("Failed to write service messages")?;
    writer.flush().context("Failed to flush output")?;

    info!(
        total = summary.total(),
        passed = summary.passed,
        failed = summary.failed,
        ignored = summary.ignored,
        races = summary.races,
        abnormal = summary.abnormal,
        suites = summary.suites,
        "Conversion complete"
    );
    Ok(summary)
}

fn open_input(config: &Config) -> anyhow::Result<Box<dyn BufRead>> {
    match &config.input {
        Some(path) => {
            debug!(path = %path.display(), "Reading test log from file");
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            debug!("Reading test log from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

fn open_output(config: &Config) -> anyhow::Result<Box<dyn Write>> {
    match &config.output {
        Some(path) => {
            debug!(path = %path.display(), "Writing service messages to file");
            let file = File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
