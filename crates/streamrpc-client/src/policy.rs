//! Retry Policies
//!
//! A [`RetryPolicy`] bundles the three inputs the retry operator consults:
//! a predicate over the RPC error, a maximum retry count, and an
//! asynchronous before-retry gate that must resolve before the next attempt
//! is issued. Policies are caller-constructed, immutable values; the
//! operator applies no retry behavior beyond what the policy states.

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use streamrpc_common::{CallError, RpcError};

use crate::backoff::with_exponential_delay;

/// Outcome of a before-retry gate.
///
/// `Err(Some(error))` fails the retry session with that error.
/// `Err(None)` fails it with no independent reason; the operator then
/// propagates the original RPC error to preserve the causal context.
pub type GateResult = std::result::Result<(), Option<CallError>>;

/// The asynchronous signal produced by a before-retry gate.
pub type GateFuture = BoxFuture<'static, GateResult>;

/// Decides whether an RPC error is worth retrying.
pub type RetryPredicate = Arc<dyn Fn(&RpcError) -> bool + Send + Sync>;

/// Asynchronous precondition run before each retry attempt.
///
/// Receives the 0-based attempt number and the error that triggered the
/// retry.
pub type BeforeRetry = Arc<dyn Fn(u32, &RpcError) -> GateFuture + Send + Sync>;

/// A configurable retry policy.
///
/// Used with the [`retry`](crate::retry::retry) operator. The operator
/// consults `should_retry` and `max_retries` independently — both must pass
/// for a retry to be issued — and then awaits `before_retry` as the gate
/// for the next attempt.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use streamrpc_client::RetryPolicy;
/// use streamrpc_common::StatusCode;
///
/// let policy = RetryPolicy::exponential(Duration::from_millis(500), None)
///     .with_max_retries(5)
///     .with_should_retry(|error| error.code == StatusCode::Unavailable);
/// assert_eq!(policy.max_retries, 5);
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    /// Determines whether a call failing with the given error is retried
    pub should_retry: RetryPredicate,
    /// Number of times to retry the call before giving up
    pub max_retries: u32,
    /// Gate awaited before each retry attempt is issued
    pub before_retry: BeforeRetry,
}

impl RetryPolicy {
    /// A policy that never retries calls: any error surfaces immediately.
    pub fn never() -> Self {
        RetryPolicy {
            should_retry: Arc::new(|_| false),
            max_retries: 0,
            before_retry: immediate_gate(),
        }
    }

    /// A policy that retries calls failing with a non-OK status code.
    ///
    /// Defaults: 2 retries, no delay between attempts. Use the `with_*`
    /// methods or [`with_exponential_delay`] to adjust.
    pub fn response_not_ok() -> Self {
        RetryPolicy {
            should_retry: Arc::new(|error| !error.code.is_ok()),
            max_retries: 2,
            before_retry: immediate_gate(),
        }
    }

    /// A policy that retries non-OK responses with an exponentially growing
    /// delay between attempts.
    ///
    /// `max_delay` defaults to [`DEFAULT_MAX_DELAY`](crate::backoff::DEFAULT_MAX_DELAY).
    pub fn exponential(initial_delay: Duration, max_delay: Option<Duration>) -> Self {
        let mut policy = Self::response_not_ok();
        policy.before_retry =
            with_exponential_delay(initial_delay, max_delay, |_| Box::pin(async { Ok(()) }));
        policy
    }

    /// Replaces the retry predicate.
    pub fn with_should_retry<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&RpcError) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(predicate);
        self
    }

    /// Replaces the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Replaces the before-retry gate.
    pub fn with_before_retry<G>(mut self, gate: G) -> Self
    where
        G: Fn(u32, &RpcError) -> GateFuture + Send + Sync + 'static,
    {
        self.before_retry = Arc::new(gate);
        self
    }
}

impl Default for RetryPolicy {
    /// Absent an explicit policy there is no retry behavior.
    fn default() -> Self {
        Self::never()
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// A gate that resolves immediately; the default for builtin policies.
pub fn immediate_gate() -> BeforeRetry {
    Arc::new(|_, _| Box::pin(futures::future::ready(Ok(()))))
}
