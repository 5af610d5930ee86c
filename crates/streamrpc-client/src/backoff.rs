//! Backoff Calculator
//!
//! Pure exponential backoff arithmetic, plus [`with_exponential_delay`] for
//! composing the delay into a retry policy's before-retry gate. Growth is
//! deterministic (no jitter) and capped at a ceiling so the delay stays
//! bounded.

use std::sync::Arc;
use std::time::Duration;

use streamrpc_common::RpcError;

use crate::policy::{BeforeRetry, GateFuture};

/// Ceiling applied when no explicit maximum delay is configured: one hour.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// Calculates the delay for a retry attempt.
///
/// The delay is `min(2^attempt * interval, max_interval)`, with `attempt`
/// numbered from 0 (the first retry waits `interval`).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use streamrpc_client::exponential_backoff;
///
/// let delay = exponential_backoff(
///     3,
///     Duration::from_millis(500),
///     Duration::from_millis(60_000),
/// );
/// assert_eq!(delay, Duration::from_millis(4_000));
/// ```
pub fn exponential_backoff(attempt: u32, interval: Duration, max_interval: Duration) -> Duration {
    // The shift is clamped so the multiplier cannot overflow; clamped
    // attempts are beyond any practical cap already.
    let multiplier = 1_u64 << attempt.min(30);
    let millis = (interval.as_millis() as u64).saturating_mul(multiplier);
    Duration::from_millis(millis.min(max_interval.as_millis() as u64))
}

/// Composes an exponentially growing delay into a before-retry gate.
///
/// The returned gate runs `gate` first. If it succeeds, the composed gate
/// resolves after `exponential_backoff(attempt, initial_delay, cap)` has
/// elapsed; if it fails, the failure propagates immediately without the
/// delay. `max_delay` defaults to [`DEFAULT_MAX_DELAY`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use streamrpc_client::{with_exponential_delay, RetryPolicy};
///
/// let mut policy = RetryPolicy::response_not_ok();
/// policy.before_retry = with_exponential_delay(
///     Duration::from_millis(500),
///     Some(Duration::from_secs(60)),
///     |_error| Box::pin(async { Ok(()) }),
/// );
/// ```
pub fn with_exponential_delay<G>(
    initial_delay: Duration,
    max_delay: Option<Duration>,
    gate: G,
) -> BeforeRetry
where
    G: Fn(&RpcError) -> GateFuture + Send + Sync + 'static,
{
    let cap = max_delay.unwrap_or(DEFAULT_MAX_DELAY);
    Arc::new(move |attempt, error| {
        let delay = exponential_backoff(attempt, initial_delay, cap);
        let inner = gate(error);
        Box::pin(async move {
            inner.await?;
            tokio::time::sleep(delay).await;
            Ok(())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamrpc_common::{CallError, RpcError, StatusCode};

    #[test]
    fn test_first_retry_waits_the_base_interval() {
        let delay = exponential_backoff(
            0,
            Duration::from_millis(500),
            Duration::from_millis(60_000),
        );
        assert_eq!(delay, Duration::from_millis(500));
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let delay = exponential_backoff(
            3,
            Duration::from_millis(500),
            Duration::from_millis(60_000),
        );
        assert_eq!(delay, Duration::from_millis(4_000));
    }

    #[test]
    fn test_delay_is_capped() {
        let delay = exponential_backoff(
            10,
            Duration::from_millis(500),
            Duration::from_millis(60_000),
        );
        assert_eq!(delay, Duration::from_millis(60_000));
    }

    #[test]
    fn test_huge_attempt_numbers_do_not_overflow() {
        let delay = exponential_backoff(
            u32::MAX,
            Duration::from_millis(500),
            DEFAULT_MAX_DELAY,
        );
        assert_eq!(delay, DEFAULT_MAX_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_composed_gate_applies_delay_after_gate_success() {
        let before_retry = with_exponential_delay(
            Duration::from_millis(500),
            Some(Duration::from_secs(60)),
            |_| Box::pin(async { Ok(()) }),
        );

        let error = RpcError::new(StatusCode::Unavailable, "gone");
        let start = tokio::time::Instant::now();
        before_retry(2, &error).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_composed_gate_propagates_gate_failure_without_delay() {
        let before_retry = with_exponential_delay(
            Duration::from_secs(30),
            None,
            |_| Box::pin(async { Err(Some(CallError::Transport("gate down".into()))) }),
        );

        let error = RpcError::new(StatusCode::Unavailable, "gone");
        let start = tokio::time::Instant::now();
        let failure = before_retry(0, &error).await.unwrap_err();
        assert_eq!(failure, Some(CallError::Transport("gate down".into())));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
