//! gotc library
//!
//! This module exports the command line configuration and the conversion
//! pipeline of gotc for use in integration tests and as a library.

pub mod config;
pub mod pipeline;
