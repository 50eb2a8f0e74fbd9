//! Retry budget for provider calls.
//!
//! A call gets at most one extra attempt. Only two situations earn it: a
//! transport failure (connection refused/reset, DNS), and a 429 whose
//! `Retry-After` hint fits under `max_retry_after`. Everything else fails on
//! the first attempt.

use std::time::Duration;

/// Extra attempts allowed per call.
pub const MAX_EXTRA_ATTEMPTS: u32 = 1;

/// Default delay before retrying a transport failure.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Default ceiling on a `Retry-After` hint that is still worth waiting for.
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(2);

/// What went wrong on a single attempt, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCause {
    /// The request never produced an HTTP response.
    Transport,
    /// HTTP 429, with the parsed hint if any.
    RateLimited(Option<Duration>),
    /// Any other failure. Never retried.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed delay before retrying a transport failure.
    pub delay: Duration,
    /// Largest `Retry-After` hint honoured with a retry.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, or `None` when the call must fail now.
    ///
    /// `attempts_made` counts attempts already sent, including the first.
    pub fn next_delay(&self, attempts_made: u32, cause: RetryCause) -> Option<Duration> {
        if attempts_made > MAX_EXTRA_ATTEMPTS {
            return None;
        }
        match cause {
            RetryCause::Transport => Some(self.delay),
            RetryCause::RateLimited(Some(hint)) if hint <= self.max_retry_after => Some(hint),
            RetryCause::RateLimited(_) | RetryCause::Fatal => None,
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
///
/// HTTP-date values are not interpreted and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
