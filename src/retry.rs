//! Bounded retry driven by server-provided wait hints
//!
//! [`with_retry`] runs an operation up to `max_attempts` times. After each
//! attempt a predicate decides whether the result is worth retrying, and a
//! backoff function turns that result into the delay before the next try.
//! The combinator never fails on its own: it hands back the last value it
//! saw, tagged with whether the budget ran out.
//!
//! # Example
//!
//! ```no_run
//! use playlist_bridge::retry::{RetryOutcome, with_retry};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let outcome = with_retry(
//!     3,
//!     |status: &u16| *status == 429,
//!     |_| Duration::from_millis(100),
//!     || async { 200u16 },
//! )
//! .await;
//! assert!(matches!(outcome, RetryOutcome::Completed { value: 200, .. }));
//! # }
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Name of the header carrying the server's wait hint
pub const RETRY_AFTER: &str = "retry-after";

/// Result of [`with_retry`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// The operation produced a value the predicate did not want retried
    Completed {
        /// The final value
        value: T,
        /// Attempts used, including the first
        attempts: u32,
    },
    /// Every attempt produced a retryable value; `last` is the final one
    Exhausted {
        /// The value from the final attempt
        last: T,
        /// Attempts used, equal to the budget
        attempts: u32,
    },
}

impl<T> RetryOutcome<T> {
    /// The final value, whichever way the loop ended
    pub fn into_inner(self) -> T {
        match self {
            RetryOutcome::Completed { value, .. } => value,
            RetryOutcome::Exhausted { last, .. } => last,
        }
    }

    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Completed { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    /// True when the retry budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryOutcome::Exhausted { .. })
    }
}

/// Execute an async operation, retrying while `is_retryable` holds
///
/// # Arguments
///
/// * `max_attempts` - Total attempts, including the first (0 is treated as 1)
/// * `is_retryable` - Whether a result should be retried
/// * `backoff` - Delay to wait after a retryable result
/// * `operation` - The operation, invoked once per attempt
///
/// No delay is taken after the final attempt.
pub async fn with_retry<F, Fut, T, R, B>(
    max_attempts: u32,
    is_retryable: R,
    backoff: B,
    mut operation: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
    R: Fn(&T) -> bool,
    B: Fn(&T) -> Duration,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let value = operation().await;
        attempt += 1;

        if !is_retryable(&value) {
            if attempt > 1 {
                tracing::info!(attempts = attempt, "operation succeeded after retry");
            }
            return RetryOutcome::Completed {
                value,
                attempts: attempt,
            };
        }

        if attempt >= max_attempts {
            tracing::error!(
                attempts = attempt,
                "operation still retryable after all attempts exhausted"
            );
            return RetryOutcome::Exhausted {
                last: value,
                attempts: attempt,
            };
        }

        let delay = backoff(&value);
        tracing::warn!(
            attempt = attempt,
            remaining = max_attempts - attempt,
            delay = ?delay,
            "retryable result, waiting before next attempt"
        );

        // Release the value before suspending
        drop(value);
        tokio::time::sleep(delay).await;
    }
}

/// Delay requested by a `retry-after` header, plus a fixed margin
///
/// The header is read as a whole number of `unit`s. A missing or
/// unparseable header counts as zero units.
pub fn retry_after_delay(
    headers: &BTreeMap<String, String>,
    unit: Duration,
    margin: Duration,
) -> Duration {
    let units = match headers.get(RETRY_AFTER) {
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(units) => units,
            Err(_) => {
                tracing::warn!(value = %raw, "unparseable retry-after header");
                0
            }
        },
        None => {
            tracing::warn!("rate limited without a retry-after header");
            0
        }
    };

    unit.saturating_mul(units).saturating_add(margin)
}
