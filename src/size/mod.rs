//! Remote resource size resolution.
//!
//! This module answers "how many bytes is the resource at this URL?" without
//! downloading it when the server declares a length.
//!
//! # Features
//!
//! - `HEAD` probe reading `Content-Length`
//! - Streaming `GET` fallback that counts bytes in constant memory
//! - Exponential backoff (1s, 2s, 4s, ... capped at 10s) for transient failures
//! - One overall deadline shared by every attempt and backoff sleep
//! - Binary unit conversion and human-readable formatting
//!
//! # Example
//!
//! ```no_run
//! use remote_size::size::{SizeQuery, SizeResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let query = SizeQuery::new("https://example.com/debian.iso", "gib", 20_000, 4)?;
//! let size = SizeResolver::default().resolve(&query).await?;
//! println!("{size} GiB");
//! # Ok(())
//! # }
//! ```

pub mod constants;
mod deadline;
mod error;
mod probe;
mod resolver;
mod retry;
mod unit;

pub use constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_MS, DEFAULT_UNIT};
pub use deadline::{Deadline, DeadlineElapsed};
pub use error::{ProbeError, SizeError};
pub use probe::{HttpProbe, ProbeRequest, SizeProbe, count_stream_bytes};
pub use resolver::{SizeQuery, SizeResolver, resolve_size};
pub use retry::{FailureType, ProbeOutcome, RetryDecision, RetryPolicy, classify_error};
pub use unit::{SizeUnit, SizeValue, format_human, supported_units};
