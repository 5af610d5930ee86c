//! Retry Operator
//!
//! [`retry`] wraps a resubscribable stream and implements policy-driven
//! resubscription. Each subscription runs its own small state machine:
//!
//! - `Active`: polling the source. Values pass through; completion ends the
//!   operator with success.
//! - On an RPC error, the policy is consulted: if the attempt budget is
//!   spent or the predicate declines, the error propagates as terminal.
//!   Otherwise the before-retry gate is started.
//! - `Gating`: awaiting the gate. Gate success increments the attempt
//!   counter and resubscribes the source; gate failure terminates the
//!   stream (with the gate's error, or with the original RPC error when the
//!   gate failed without a reason of its own).
//!
//! Attempts are strictly serialized — a resubscription is never issued
//! before the previous attempt's error has been processed and the gate has
//! resolved. Dropping the stream mid-call, mid-gate, or mid-delay cancels
//! everything; no late event or resubscription can surface afterwards.

use futures::{Future, Stream};
use std::pin::Pin;
use std::task::{Context, Poll};

use streamrpc_common::{CallError, Result, RpcError};

use crate::bridge::Resubscribe;
use crate::policy::{GateFuture, RetryPolicy};

/// Adds automatic retry to a call stream.
///
/// - If the error does not carry the RPC error shape, the call is not
///   retried and the stream fails with that error.
/// - If the error is retryable but exceeds the maximum retry attempts, the
///   stream fails with the error.
/// - If the policy's before-retry gate fails, the stream fails with the
///   gate's error (or with the original call error when the gate has no
///   independent reason).
/// - Otherwise the source is resubscribed and the call runs again from
///   scratch; values already emitted are not reissued or rolled back.
///
/// # Example
///
/// ```
/// use futures::StreamExt;
/// use std::time::Duration;
/// use streamrpc_client::{bridge, retry, RetryPolicy};
/// use streamrpc_common::{Result, RpcCall};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = bridge(|| RpcCall::unary(async { Result::Ok(42_u32) }));
/// let policy = RetryPolicy::exponential(Duration::from_millis(500), None);
/// let mut stream = retry(policy, source);
/// assert_eq!(stream.next().await.unwrap().unwrap(), 42);
/// # }
/// ```
pub fn retry<S>(policy: RetryPolicy, source: S) -> RetryStream<S>
where
    S: Resubscribe,
{
    RetryStream::new(source, policy)
}

/// A stream transformer implementing policy-driven resubscription.
///
/// Produced by [`retry`] or [`CallStream::retry`](crate::bridge::CallStream::retry).
pub struct RetryStream<S> {
    source: S,
    policy: RetryPolicy,
    /// 0-based count of resubscriptions issued for this subscription.
    attempt: u32,
    state: RetryState,
}

enum RetryState {
    /// Polling the source
    Active,
    /// Awaiting the before-retry gate
    Gating {
        gate: GateFuture,
        original: RpcError,
    },
    /// Terminal event delivered; no further events
    Terminated,
}

impl<S> RetryStream<S> {
    pub(crate) fn new(source: S, policy: RetryPolicy) -> Self {
        RetryStream {
            source,
            policy,
            attempt: 0,
            state: RetryState::Active,
        }
    }
}

impl<S, T> Stream for RetryStream<S>
where
    S: Stream<Item = Result<T>> + Resubscribe + Unpin,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                RetryState::Active => match Pin::new(&mut this.source).poll_next(cx) {
                    Poll::Ready(Some(Ok(value))) => return Poll::Ready(Some(Ok(value))),
                    Poll::Ready(Some(Err(CallError::Rpc(error)))) => {
                        let retryable = this.attempt < this.policy.max_retries
                            && (this.policy.should_retry)(&error);
                        if !retryable {
                            tracing::debug!(
                                code = %error.code,
                                attempt = this.attempt,
                                "not retrying; propagating error"
                            );
                            this.state = RetryState::Terminated;
                            return Poll::Ready(Some(Err(CallError::Rpc(error))));
                        }
                        let gate = (this.policy.before_retry)(this.attempt, &error);
                        this.state = RetryState::Gating {
                            gate,
                            original: error,
                        };
                    }
                    // Errors without the RPC error shape bypass the policy.
                    Poll::Ready(Some(Err(error))) => {
                        this.state = RetryState::Terminated;
                        return Poll::Ready(Some(Err(error)));
                    }
                    Poll::Ready(None) => {
                        this.state = RetryState::Terminated;
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                RetryState::Gating { gate, original } => match gate.as_mut().poll(cx) {
                    Poll::Ready(Ok(())) => {
                        this.attempt += 1;
                        tracing::debug!(attempt = this.attempt, "retrying call");
                        this.source.resubscribe();
                        this.state = RetryState::Active;
                    }
                    Poll::Ready(Err(Some(gate_error))) => {
                        this.state = RetryState::Terminated;
                        return Poll::Ready(Some(Err(gate_error)));
                    }
                    // The gate failed without a reason of its own; keep the
                    // causal context by propagating the original error.
                    Poll::Ready(Err(None)) => {
                        let original = original.clone();
                        this.state = RetryState::Terminated;
                        return Poll::Ready(Some(Err(CallError::Rpc(original))));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                RetryState::Terminated => return Poll::Ready(None),
            }
        }
    }
}
