//! Bounded retry-on-rate-limit for outbound API calls.
//!
//! A rate-limited call sleeps a fixed interval and tries again. The total
//! wait is bounded and measured from the first attempt, never reset between
//! retries. Every other failure surfaces immediately. The caller knows
//! nothing about the operation it wraps beyond its name.

use crate::api::ApiError;
use crate::error::{BotError, Result};
use std::time::{Duration, Instant};

pub const RETRY_INTERVAL: Duration = Duration::from_secs(60);
pub const MAX_TOTAL_WAIT: Duration = Duration::from_secs(20 * 60);

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of time for the retry loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock with blocking sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: RETRY_INTERVAL,
            max_wait: MAX_TOTAL_WAIT,
        }
    }
}

/// What a reply attempt amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Posted,
    /// The service rejected the text as a duplicate of an earlier post. The
    /// reply is already out there, so this counts as done.
    Duplicate,
}

// ---------------------------------------------------------------------------
// BackoffCaller
// ---------------------------------------------------------------------------

pub struct BackoffCaller<C: Clock = SystemClock> {
    policy: RetryPolicy,
    clock: C,
}

impl BackoffCaller<SystemClock> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> BackoffCaller<C> {
    pub fn with_clock(policy: RetryPolicy, clock: C) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `op`, retrying while it reports `RateLimited` and the wait budget
    /// lasts.
    pub fn call<T, F>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> std::result::Result<T, ApiError>,
    {
        let first_attempt = self.clock.now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !matches!(err, ApiError::RateLimited { .. }) {
                return Err(BotError::Api {
                    operation: operation.to_string(),
                    source: err,
                });
            }

            let waited = self.clock.now().saturating_duration_since(first_attempt);
            if waited >= self.policy.max_wait {
                tracing::warn!(
                    operation,
                    attempts,
                    waited_secs = waited.as_secs(),
                    "giving up: still rate-limited"
                );
                return Err(BotError::RateLimitExceeded {
                    operation: operation.to_string(),
                    waited,
                    source: err,
                });
            }

            tracing::info!(
                operation,
                attempts,
                sleep_secs = self.policy.interval.as_secs(),
                "rate-limited, retrying"
            );
            self.clock.sleep(self.policy.interval);
        }
    }

    /// Like [`call`](Self::call) for posting a reply, with duplicate-content
    /// rejections absorbed as [`ReplyOutcome::Duplicate`].
    pub fn call_reply<F>(&self, operation: &str, mut op: F) -> Result<ReplyOutcome>
    where
        F: FnMut() -> std::result::Result<(), ApiError>,
    {
        self.call(operation, || match op() {
            Ok(()) => Ok(ReplyOutcome::Posted),
            Err(ApiError::DuplicateContent) => {
                tracing::warn!(operation, "duplicate content, treating reply as already posted");
                Ok(ReplyOutcome::Duplicate)
            }
            Err(err) => Err(err),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;
    use std::cell::Cell;

    fn rate_limited() -> ApiError {
        ApiError::RateLimited { retry_after: None }
    }

    #[test]
    fn success_needs_no_retry() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let value = caller.call("search", || Ok::<_, ApiError>(7)).unwrap();
        assert_eq!(value, 7);
        assert!(clock.sleeps.borrow().is_empty());
    }

    #[test]
    fn always_rate_limited_gives_up_at_budget() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let calls = Cell::new(0u32);

        let err = caller
            .call("search", || {
                calls.set(calls.get() + 1);
                Err::<(), _>(rate_limited())
            })
            .unwrap_err();

        // Attempts at t = 0, 1, ..., 20 minutes; the one at 20 gives up.
        assert_eq!(calls.get(), 21);
        assert_eq!(clock.elapsed(), MAX_TOTAL_WAIT);
        assert!(clock.sleeps.borrow().iter().all(|d| *d == RETRY_INTERVAL));
        match err {
            BotError::RateLimitExceeded {
                operation,
                waited,
                source,
            } => {
                assert_eq!(operation, "search");
                assert!(waited >= MAX_TOTAL_WAIT);
                assert_eq!(source, rate_limited());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn never_gives_up_before_budget() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let calls = Cell::new(0u32);

        // Rate-limited for 19 minutes' worth of attempts, then succeeds.
        let value = caller
            .call("follower_count", || {
                calls.set(calls.get() + 1);
                if calls.get() < 20 {
                    Err(rate_limited())
                } else {
                    Ok(512u64)
                }
            })
            .unwrap();

        assert_eq!(value, 512);
        assert_eq!(clock.elapsed(), Duration::from_secs(19 * 60));
    }

    #[test]
    fn budget_is_not_reset_between_retries() {
        let clock = ManualClock::new();
        let policy = RetryPolicy {
            interval: Duration::from_secs(7 * 60),
            max_wait: MAX_TOTAL_WAIT,
        };
        let caller = BackoffCaller::with_clock(policy, &clock);
        let err = caller
            .call("search", || Err::<(), _>(rate_limited()))
            .unwrap_err();
        assert!(matches!(err, BotError::RateLimitExceeded { .. }));
        // 0, 7, 14, 21 -> gives up at the first check past 20 minutes.
        assert_eq!(clock.sleeps.borrow().len(), 3);
    }

    #[test]
    fn other_errors_are_not_retried() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let calls = Cell::new(0u32);
        let err = caller
            .call("search", || {
                calls.set(calls.get() + 1);
                Err::<(), _>(ApiError::other("invalid token"))
            })
            .unwrap_err();
        assert_eq!(calls.get(), 1);
        assert!(clock.sleeps.borrow().is_empty());
        assert!(matches!(err, BotError::Api { .. }));
        assert!(err.to_string().contains("invalid token"));
    }

    #[test]
    fn duplicate_reply_is_success_without_effect() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let outcome = caller
            .call_reply("post_reply", || Err(ApiError::DuplicateContent))
            .unwrap();
        assert_eq!(outcome, ReplyOutcome::Duplicate);
    }

    #[test]
    fn reply_retries_rate_limit_then_posts() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let calls = Cell::new(0u32);
        let outcome = caller
            .call_reply("post_reply", || {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(rate_limited())
                } else {
                    Ok(())
                }
            })
            .unwrap();
        assert_eq!(outcome, ReplyOutcome::Posted);
        assert_eq!(clock.elapsed(), RETRY_INTERVAL);
    }

    #[test]
    fn duplicate_outside_reply_is_an_error() {
        let clock = ManualClock::new();
        let caller = BackoffCaller::with_clock(RetryPolicy::default(), &clock);
        let err = caller
            .call("search", || Err::<(), _>(ApiError::DuplicateContent))
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::Api {
                source: ApiError::DuplicateContent,
                ..
            }
        ));
    }
}
