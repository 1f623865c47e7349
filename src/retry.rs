//! Retry policies for the HTTP transport.
//!
//! A policy is consulted once per failed attempt with the error and the
//! number of retries already attempted; both methods are pure functions of
//! those inputs. The transport sleeps for the returned delay and loops while
//! the policy says yes; on "no" the last error propagates to the caller
//! unchanged.

use std::fmt;
use std::time::Duration;

use crate::error::Error;

/// Decides whether and when a failed request attempt is retried.
pub trait RetryPolicy: fmt::Debug + Send + Sync {
    /// Whether to retry after `error`, given `retries_attempted` retries so
    /// far (0 on the first failure).
    fn should_retry(&self, error: &Error, retries_attempted: u32) -> bool;

    /// How long to wait before the next retry.
    fn delay_before_next_retry(&self, error: &Error, retries_attempted: u32) -> Duration;
}

/// Exponential back-off policy: `min(max_delay, base_interval << attempt)`.
///
/// Retries connection-level failures and server errors with a transient
/// status (500/502/503/408). Client errors are never retried. No jitter, no
/// circuit breaker.
#[derive(Debug, Clone)]
pub struct BackOffRetryPolicy {
    max_error_retry: u32,
    max_delay: Duration,
    base_interval: Duration,
}

impl BackOffRetryPolicy {
    pub fn new(max_error_retry: u32, max_delay: Duration, base_interval: Duration) -> Self {
        BackOffRetryPolicy {
            max_error_retry,
            max_delay,
            base_interval,
        }
    }

    fn is_retryable(error: &Error) -> bool {
        match error {
            Error::Http(_) => true,
            Error::Server { status_code, .. } => {
                matches!(status_code, 500 | 502 | 503 | 408)
            }
            Error::Client(_) | Error::Io(_) => false,
        }
    }
}

impl Default for BackOffRetryPolicy {
    /// 3 retries, 300 ms base interval, 20 s delay cap.
    fn default() -> Self {
        BackOffRetryPolicy::new(3, Duration::from_secs(20), Duration::from_millis(300))
    }
}

impl RetryPolicy for BackOffRetryPolicy {
    fn should_retry(&self, error: &Error, retries_attempted: u32) -> bool {
        retries_attempted < self.max_error_retry && Self::is_retryable(error)
    }

    fn delay_before_next_retry(&self, _error: &Error, retries_attempted: u32) -> Duration {
        let shift = retries_attempted.min(31);
        let delay = self
            .base_interval
            .checked_mul(1 << shift)
            .unwrap_or(self.max_delay);
        delay.min(self.max_delay)
    }
}

/// Policy that never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetryPolicy;

impl RetryPolicy for NoRetryPolicy {
    fn should_retry(&self, _error: &Error, _retries_attempted: u32) -> bool {
        false
    }

    fn delay_before_next_retry(&self, _error: &Error, _retries_attempted: u32) -> Duration {
        Duration::ZERO
    }
}
