//! Remote Size Core Library
//!
//! Determines the size of a resource behind an HTTP(S) URL, in a
//! caller-chosen unit, without downloading it when the server declares a
//! length. Intended for download managers and pre-flight disk-space checks
//! that need a byte count before committing to a transfer.
//!
//! # Architecture
//!
//! - [`size`] - probing, retry/backoff, deadline, and unit conversion
//!
//! The single entry point is [`resolve_size`].

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod size;
mod user_agent;

// Re-export commonly used types
pub use size::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_MS, DEFAULT_UNIT, HttpProbe, ProbeError, SizeError,
    SizeProbe, SizeQuery, SizeResolver, SizeUnit, SizeValue, resolve_size,
};
