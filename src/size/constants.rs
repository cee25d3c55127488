//! Constants for the size module (defaults, backoff, client timeouts).

use std::time::Duration;

/// Default unit requested when the caller does not name one.
pub const DEFAULT_UNIT: &str = "bytes";

/// Default overall deadline for one size resolution (20 seconds).
pub const DEFAULT_TIMEOUT_MS: i64 = 20_000;

/// Default maximum attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: i64 = 4;

/// Delay before the first retry (1 second).
pub const BASE_BACKOFF_DELAY: Duration = Duration::from_secs(1);

/// Ceiling for any single backoff delay (10 seconds).
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(10);

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;
