// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gotc-events

use thiserror::Error;

/// Errors that can occur while emitting service messages
///
/// Malformed input never produces an error: the converter always prefers
/// passing a line through over rejecting it. Only the sink can fail.
#[derive(Debug, Error)]
pub enum EventsError {
    /// Error writing to the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
