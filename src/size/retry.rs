//! Retry classification and exponential backoff for size probes.
//!
//! A failed probe is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - may succeed on a later attempt
//! - [`FailureType::Permanent`] - will not succeed regardless of retries
//!
//! The [`RetryPolicy`] then decides whether another attempt is made and how
//! long to wait first.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use remote_size::size::{FailureType, ProbeError, RetryDecision, RetryPolicy, classify_error};
//!
//! let policy = RetryPolicy::with_max_attempts(4);
//! let error = ProbeError::unexpected_status("https://example.com/file.iso", "HEAD", 503);
//!
//! let decision = policy.should_retry(classify_error(&error), 1);
//! assert_eq!(
//!     decision,
//!     RetryDecision::Retry { delay: Duration::from_secs(1), attempt: 2 }
//! );
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use super::constants::{BASE_BACKOFF_DELAY, MAX_BACKOFF_DELAY};
use super::error::ProbeError;

/// Backoff multiplier (doubles each attempt).
const BACKOFF_MULTIPLIER: u32 = 2;

/// Classification of a probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: timeout, connection refused, deadline abort, non-200 status.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: malformed URL.
    Permanent,
}

/// Result of one probe attempt as seen by the retry loop.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The probe produced a byte count.
    Success(u64),
    /// The attempt failed but another one may succeed.
    Retryable(ProbeError),
    /// The attempt failed and retrying cannot help.
    Terminal(ProbeError),
}

impl From<Result<u64, ProbeError>> for ProbeOutcome {
    fn from(result: Result<u64, ProbeError>) -> Self {
        match result {
            Ok(bytes) => Self::Success(bytes),
            Err(error) => match classify_error(&error) {
                FailureType::Transient => Self::Retryable(error),
                FailureType::Permanent => Self::Terminal(error),
            },
        }
    }
}

/// Decision on whether to retry a failed probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Probe again after the specified delay.
    Retry {
        /// How long to wait before the next attempt.
        delay: Duration,
        /// Which attempt comes next (1-indexed, so the first retry is attempt 2).
        attempt: u32,
    },

    /// Stop probing.
    DoNotRetry {
        /// Human-readable reason.
        reason: String,
    },
}

/// Attempt budget and backoff schedule.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * 2^(attempt - 1), max_delay)
/// ```
///
/// where `attempt` is the attempt that just failed. With defaults the delays
/// are 1s, 2s, 4s, 8s, then 10s for every later retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay before the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the default 1s base delay and 10s cap.
    ///
    /// `max_attempts` below one is raised to one.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: BASE_BACKOFF_DELAY,
            max_delay: MAX_BACKOFF_DELAY,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides whether to probe again after `attempt` (1-indexed) failed.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.backoff_delay(attempt),
            attempt: attempt + 1,
        }
    }

    /// Delay to wait after `attempt` (1-indexed) failed.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        BACKOFF_MULTIPLIER
            .checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Classifies a probe failure for retry decisions.
///
/// Status codes are not split into client and server errors: any non-200
/// answer may reflect transient server state.
#[must_use]
pub fn classify_error(error: &ProbeError) -> FailureType {
    match error {
        ProbeError::Network { .. }
        | ProbeError::Timeout { .. }
        | ProbeError::DeadlineExceeded { .. }
        | ProbeError::UnexpectedStatus { .. } => FailureType::Transient,

        ProbeError::InvalidUrl { .. } => FailureType::Permanent,
    }
}
