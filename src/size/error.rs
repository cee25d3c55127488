//! Error types for the size module.
//!
//! [`SizeError`] is what callers of [`resolve_size`](super::resolve_size) see.
//! [`ProbeError`] describes why a single probe attempt failed; the retry loop
//! classifies it and either retries or wraps it into a [`SizeError`].

use thiserror::Error;

/// Errors surfaced by a size resolution.
#[derive(Debug, Error)]
pub enum SizeError {
    /// The URL is empty, not `http(s)://`, or structurally malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The requested unit is not one of the supported names.
    #[error("invalid unit '{unit}': supported units are {supported}")]
    InvalidFormat {
        /// The rejected unit string, as given.
        unit: String,
        /// Comma-separated list of every accepted unit name.
        supported: String,
    },

    /// The timeout is negative.
    #[error("invalid timeout {timeout_ms}ms: must be a non-negative number of milliseconds")]
    InvalidTimeout {
        /// The rejected timeout value.
        timeout_ms: i64,
    },

    /// The attempt budget is below one.
    #[error("invalid max attempts {max_attempts}: at least 1 attempt is required")]
    InvalidMaxAttempts {
        /// The rejected attempt count.
        max_attempts: i64,
    },

    /// A probe failed in a way retrying cannot fix.
    #[error("size probe failed: {source}")]
    Probe {
        /// The terminal probe failure.
        #[source]
        source: ProbeError,
    },

    /// Every attempt failed with a retryable error.
    #[error("failed to resolve size after {attempts} attempts; last error: {last_error}")]
    AttemptsExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The failure of the final attempt.
        #[source]
        last_error: ProbeError,
    },
}

impl SizeError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid unit error listing the supported names.
    pub fn invalid_format(unit: impl Into<String>, supported: impl Into<String>) -> Self {
        Self::InvalidFormat {
            unit: unit.into(),
            supported: supported.into(),
        }
    }

    /// Creates an exhaustion error wrapping the last attempt's failure.
    pub fn attempts_exhausted(attempts: u32, last_error: ProbeError) -> Self {
        Self::AttemptsExhausted {
            attempts,
            last_error,
        }
    }

    /// Maps a terminal probe failure to the caller-facing error.
    ///
    /// A malformed URL discovered by the probe is reported as
    /// [`SizeError::InvalidUrl`], the same as one caught by validation.
    pub fn terminal(source: ProbeError) -> Self {
        match source {
            ProbeError::InvalidUrl { url } => Self::InvalidUrl { url },
            source => Self::Probe { source },
        }
    }
}

/// Why a single probe attempt failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Network-level error (DNS resolution, connection refused, reset, etc.)
    #[error("network error probing {url}: {source}")]
    Network {
        /// The URL being probed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request (or the body stream) exceeded its per-request timeout.
    #[error("timeout probing {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The overall deadline for the resolution fired.
    #[error("deadline of {budget_ms}ms exceeded probing {url}")]
    DeadlineExceeded {
        /// The URL being probed when the deadline fired.
        url: String,
        /// The overall budget in milliseconds.
        budget_ms: u128,
    },

    /// HEAD or GET answered with something other than 200.
    #[error("HTTP {status} from {method} {url}")]
    UnexpectedStatus {
        /// The URL being probed.
        url: String,
        /// `HEAD` or `GET`.
        method: &'static str,
        /// The HTTP status code.
        status: u16,
    },

    /// The URL cannot be requested at all.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The malformed URL string.
        url: String,
    },
}

impl ProbeError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a deadline error for the given overall budget.
    pub fn deadline_exceeded(url: impl Into<String>, budget: std::time::Duration) -> Self {
        Self::DeadlineExceeded {
            url: url.into(),
            budget_ms: budget.as_millis(),
        }
    }

    /// Creates an unexpected status error.
    pub fn unexpected_status(url: impl Into<String>, method: &'static str, status: u16) -> Self {
        Self::UnexpectedStatus {
            url: url.into(),
            method,
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Maps a reqwest error into the matching probe error.
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else if error.is_builder() {
            Self::invalid_url(url)
        } else {
            Self::network(url, error)
        }
    }
}
