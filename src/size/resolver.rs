//! Size resolution: validation, the retry loop, and unit conversion.
//!
//! A resolution moves through `Attempting → (Backoff → Attempting)* →
//! Succeeded | Failed`. Attempts are strictly sequential and share one
//! [`Deadline`] started when the resolution begins.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use super::deadline::{Deadline, DeadlineElapsed};
use super::error::{ProbeError, SizeError};
use super::probe::{HttpProbe, ProbeRequest, SizeProbe};
use super::retry::{FailureType, ProbeOutcome, RetryDecision, RetryPolicy};
use super::unit::{SizeUnit, SizeValue};

#[allow(clippy::expect_used)]
static HTTP_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://").expect("scheme regex is valid") // Static pattern, safe to panic
});

/// A validated size request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeQuery {
    url: String,
    unit: SizeUnit,
    timeout: Duration,
    max_attempts: u32,
}

impl SizeQuery {
    /// Validates raw caller input.
    ///
    /// `timeout_ms` of zero means no deadline.
    ///
    /// # Errors
    ///
    /// - [`SizeError::InvalidUrl`] if `url` is empty or not `http(s)://`
    /// - [`SizeError::InvalidFormat`] if `unit` is not a supported name
    /// - [`SizeError::InvalidTimeout`] if `timeout_ms` is negative
    /// - [`SizeError::InvalidMaxAttempts`] if `max_attempts` is below one
    pub fn new(
        url: &str,
        unit: &str,
        timeout_ms: i64,
        max_attempts: i64,
    ) -> Result<Self, SizeError> {
        if url.is_empty() || !HTTP_SCHEME.is_match(url) {
            return Err(SizeError::invalid_url(url));
        }
        let unit = SizeUnit::parse(unit)?;
        let timeout_ms =
            u64::try_from(timeout_ms).map_err(|_| SizeError::InvalidTimeout { timeout_ms })?;
        if max_attempts < 1 {
            return Err(SizeError::InvalidMaxAttempts { max_attempts });
        }
        let max_attempts = u32::try_from(max_attempts).unwrap_or(u32::MAX);

        Ok(Self {
            url: url.to_string(),
            unit,
            timeout: Duration::from_millis(timeout_ms),
            max_attempts,
        })
    }

    /// The resource URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The requested unit.
    #[must_use]
    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// Overall budget; zero when unbounded.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attempt budget, at least one.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Mutable bookkeeping owned by one resolution.
struct RetryState {
    attempts_made: u32,
    deadline: Deadline,
}

impl RetryState {
    fn start(budget: Duration) -> Self {
        Self {
            attempts_made: 0,
            deadline: Deadline::start(budget),
        }
    }

    fn begin_attempt(&mut self) -> u32 {
        self.attempts_made += 1;
        self.attempts_made
    }
}

/// Drives probes to a converted size.
pub struct SizeResolver {
    probe: Box<dyn SizeProbe>,
}

impl Default for SizeResolver {
    fn default() -> Self {
        Self::new(HttpProbe::new())
    }
}

impl SizeResolver {
    /// Creates a resolver around a probe.
    pub fn new(probe: impl SizeProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
        }
    }

    /// Resolves the size and converts it to the query's unit.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::AttemptsExhausted`] when every attempt failed
    /// transiently, or the terminal error of the attempt that stopped the loop.
    pub async fn resolve(&self, query: &SizeQuery) -> Result<SizeValue, SizeError> {
        let bytes = self.resolve_bytes(query).await?;
        Ok(query.unit().convert(bytes))
    }

    /// Resolves the raw byte count.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    #[instrument(
        skip(self, query),
        fields(url = %query.url(), max_attempts = query.max_attempts())
    )]
    pub async fn resolve_bytes(&self, query: &SizeQuery) -> Result<u64, SizeError> {
        let policy = RetryPolicy::with_max_attempts(query.max_attempts());
        let mut state = RetryState::start(query.timeout());

        loop {
            let attempt = state.begin_attempt();
            debug!(attempt, "probing size");

            let (failure_type, error) = match self.attempt(query, &state.deadline).await {
                ProbeOutcome::Success(bytes) => {
                    info!(attempt, bytes, "size resolved");
                    return Ok(bytes);
                }
                ProbeOutcome::Retryable(error) => (FailureType::Transient, error),
                ProbeOutcome::Terminal(error) => (FailureType::Permanent, error),
            };

            match policy.should_retry(failure_type, attempt) {
                RetryDecision::Retry { attempt: next, .. } if state.deadline.is_expired() => {
                    debug!(
                        attempt,
                        next_attempt = next,
                        error = %error,
                        "deadline already fired; skipping backoff"
                    );
                }
                RetryDecision::Retry { delay, attempt: next } => {
                    warn!(
                        attempt,
                        next_attempt = next,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "size probe failed; backing off"
                    );
                    if !state.deadline.sleep(delay).await {
                        debug!(attempt, "deadline fired during backoff");
                    }
                }
                RetryDecision::DoNotRetry { reason } => {
                    warn!(attempt, error = %error, reason = %reason, "size probe failed");
                    return Err(match failure_type {
                        FailureType::Permanent => SizeError::terminal(error),
                        FailureType::Transient => SizeError::attempts_exhausted(attempt, error),
                    });
                }
            }
        }
    }

    async fn attempt(&self, query: &SizeQuery, deadline: &Deadline) -> ProbeOutcome {
        let deadline_error = || ProbeError::deadline_exceeded(query.url(), deadline.budget());
        if deadline.is_expired() {
            return ProbeOutcome::Retryable(deadline_error());
        }

        let request = ProbeRequest::new(query.url(), query.timeout());
        match deadline.run(self.probe.probe(&request)).await {
            Ok(result) => ProbeOutcome::from(result),
            Err(DeadlineElapsed) => ProbeOutcome::Retryable(deadline_error()),
        }
    }
}

/// Resolves the size of `url` in `unit` over HTTP(S).
///
/// Defaults used by the CLI are `"bytes"`, 20000 ms and 4 attempts
/// (see [`constants`](super::constants)).
///
/// # Errors
///
/// Validation errors are returned before any request is sent; see
/// [`SizeQuery::new`] and [`SizeResolver::resolve`].
///
/// # Example
///
/// ```no_run
/// # async fn example() -> Result<(), remote_size::SizeError> {
/// let url = "https://example.com/debian.iso";
/// let size = remote_size::resolve_size(url, "human", 20_000, 4).await?;
/// println!("{size}");
/// # Ok(())
/// # }
/// ```
pub async fn resolve_size(
    url: &str,
    unit: &str,
    timeout_ms: i64,
    max_attempts: i64,
) -> Result<SizeValue, SizeError> {
    let query = SizeQuery::new(url, unit, timeout_ms, max_attempts)?;
    SizeResolver::new(HttpProbe::new()).resolve(&query).await
}
