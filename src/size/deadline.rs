//! Overall deadline shared by every attempt of one size resolution.
//!
//! The deadline starts when the resolution starts and is never re-armed.
//! Attempt futures run under it (and are dropped when it fires, which closes
//! their connection or body stream), and backoff sleeps are cut short by it.
//! A zero budget means the resolution is unbounded.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Marker returned when the deadline fired before a future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineElapsed;

/// Wall-clock budget for a whole resolution.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    budget: Duration,
    expires_at: Option<Instant>,
}

impl Deadline {
    /// Starts a deadline `budget` from now. A zero budget never expires.
    #[must_use]
    pub fn start(budget: Duration) -> Self {
        let expires_at = (!budget.is_zero()).then(|| Instant::now() + budget);
        Self { budget, expires_at }
    }

    /// The budget this deadline was started with.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Whether the deadline has already fired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }

    /// Time left before the deadline fires; `None` when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }

    /// Drives `future` to completion unless the deadline fires first.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineElapsed`] if the deadline fired; `future` is dropped.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, DeadlineElapsed> {
        match self.expires_at {
            Some(expires_at) => tokio::time::timeout_at(expires_at, future)
                .await
                .map_err(|_| DeadlineElapsed),
            None => Ok(future.await),
        }
    }

    /// Sleeps for `delay`, waking early if the deadline fires.
    ///
    /// Returns `true` when the full delay elapsed.
    pub async fn sleep(&self, delay: Duration) -> bool {
        let wake_at = Instant::now() + delay;
        match self.expires_at {
            Some(expires_at) if expires_at < wake_at => {
                tokio::time::sleep_until(expires_at).await;
                false
            }
            _ => {
                tokio::time::sleep_until(wake_at).await;
                true
            }
        }
    }
}
