//! Call-to-Stream Bridge
//!
//! [`bridge`] adapts both call shapes — unary and server-streaming — into
//! one uniform [`Stream`] of results with a single termination contract:
//! zero or more values, then either one terminal error or end-of-stream,
//! never both.
//!
//! The bridge is lazy: the call factory runs on the first poll, not at
//! construction. This is what makes retry possible — resubscribing simply
//! re-arms the factory, and the next poll starts the underlying call from
//! scratch.

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{Future, Stream};
use std::pin::Pin;
use std::task::{Context, Poll};

use streamrpc_common::{CallError, Result, RpcCall, StreamEvent};

use crate::policy::RetryPolicy;
use crate::retry::RetryStream;

/// Produces one fresh attempt of an underlying remote call.
///
/// A factory is invoked exactly once per subscription, and once more per
/// retry attempt when the stream is wrapped by the retry operator. Any
/// `FnMut() -> RpcCall<T>` closure is a factory.
pub trait CallFactory<T>: Send {
    /// Starts a fresh attempt of the underlying call.
    fn call(&mut self) -> RpcCall<T>;
}

impl<T, F> CallFactory<T> for F
where
    F: FnMut() -> RpcCall<T> + Send,
{
    fn call(&mut self) -> RpcCall<T> {
        (self)()
    }
}

/// Streams that can abandon their in-flight call and start over.
///
/// This is the seam the retry operator composes over: after a retry gate
/// resolves, the operator calls [`resubscribe`](Resubscribe::resubscribe)
/// and polls the source again as if it were freshly subscribed. Dropping
/// the in-flight call must release its transport resources; no event from
/// the abandoned attempt may surface afterwards.
pub trait Resubscribe: Stream {
    /// Drops the in-flight call and re-arms the stream for a fresh attempt.
    fn resubscribe(&mut self);
}

/// Creates a stream from an RPC call factory.
///
/// - A unary call yields exactly one `Ok` value and then completes; a
///   rejected unary call yields exactly one `Err` item.
/// - A streaming call yields one `Ok` value per data event. An error event
///   terminates the stream with that error; a trailing OK status completes
///   it. A non-OK trailing status without a preceding error event
///   terminates the stream with
///   [`CallError::IncompleteTermination`].
/// - A data event without a payload terminates the stream with
///   [`CallError::MissingPayload`]; consumers never observe an absent
///   success value.
///
/// After a terminal error or completion, the stream stays exhausted even
/// if the underlying call would produce more events. Dropping the stream
/// cancels the in-flight call.
///
/// # Example
///
/// ```
/// use futures::StreamExt;
/// use streamrpc_client::bridge;
/// use streamrpc_common::{Result, RpcCall};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut stream = bridge(|| RpcCall::unary(async { Result::Ok(42_u32) }));
/// assert_eq!(stream.next().await.unwrap().unwrap(), 42);
/// assert!(stream.next().await.is_none());
/// # }
/// ```
pub fn bridge<T, F>(factory: F) -> CallStream<T, F>
where
    F: CallFactory<T>,
{
    CallStream {
        factory,
        state: CallState::Idle,
    }
}

/// A remote call viewed as a [`Stream`] of results.
///
/// Produced by [`bridge`]. Implements [`Resubscribe`], so it can be wrapped
/// by the retry operator via [`retry`](CallStream::retry).
pub struct CallStream<T, F> {
    factory: F,
    state: CallState<T>,
}

enum CallState<T> {
    /// Factory not yet invoked for the current attempt
    Idle,
    /// Unary call in flight
    Unary(BoxFuture<'static, Result<T>>),
    /// Unary value delivered; completion pending
    UnaryDone,
    /// Streaming call in flight
    Streaming(BoxStream<'static, StreamEvent<T>>),
    /// Terminal event delivered; no further events
    Terminated,
}

impl<T, F> CallStream<T, F>
where
    F: CallFactory<T>,
{
    /// Wraps this stream with the retry operator.
    ///
    /// On each RPC error the policy decides whether to resubscribe — with
    /// the gate's delay — or to propagate the error as terminal. See
    /// [`retry`](crate::retry::retry) for the full decision rules.
    pub fn retry(self, policy: RetryPolicy) -> RetryStream<Self> {
        RetryStream::new(self, policy)
    }
}

impl<T, F> Stream for CallStream<T, F>
where
    F: CallFactory<T> + Unpin,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                CallState::Idle => {
                    let call = this.factory.call();
                    tracing::debug!(shape = ?call, "starting call");
                    this.state = match call {
                        RpcCall::Unary(future) => CallState::Unary(future),
                        RpcCall::Streaming(stream) => CallState::Streaming(stream),
                    };
                }
                CallState::Unary(future) => match future.as_mut().poll(cx) {
                    Poll::Ready(Ok(value)) => {
                        this.state = CallState::UnaryDone;
                        return Poll::Ready(Some(Ok(value)));
                    }
                    Poll::Ready(Err(error)) => {
                        this.state = CallState::Terminated;
                        return Poll::Ready(Some(Err(error)));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                CallState::UnaryDone => {
                    this.state = CallState::Terminated;
                    return Poll::Ready(None);
                }
                CallState::Streaming(stream) => match stream.as_mut().poll_next(cx) {
                    Poll::Ready(Some(StreamEvent::Data(Some(value)))) => {
                        return Poll::Ready(Some(Ok(value)));
                    }
                    Poll::Ready(Some(StreamEvent::Data(None))) => {
                        this.state = CallState::Terminated;
                        return Poll::Ready(Some(Err(CallError::MissingPayload)));
                    }
                    Poll::Ready(Some(StreamEvent::Error(error))) => {
                        this.state = CallState::Terminated;
                        return Poll::Ready(Some(Err(CallError::Rpc(error))));
                    }
                    Poll::Ready(Some(StreamEvent::Status(status))) => {
                        this.state = CallState::Terminated;
                        if status.code.is_ok() {
                            return Poll::Ready(None);
                        }
                        return Poll::Ready(Some(Err(CallError::IncompleteTermination(status))));
                    }
                    // The adapter's event stream ran out without a terminal
                    // event; terminal-event discipline is the adapter's job.
                    Poll::Ready(None) => {
                        this.state = CallState::Terminated;
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                CallState::Terminated => return Poll::Ready(None),
            }
        }
    }
}

impl<T, F> Resubscribe for CallStream<T, F>
where
    F: CallFactory<T> + Unpin,
{
    fn resubscribe(&mut self) {
        // Dropping the previous state cancels any in-flight call.
        self.state = CallState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{stream, StreamExt};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use streamrpc_common::{RpcError, Status, StatusCode};

    fn streaming_call(events: Vec<StreamEvent<u32>>) -> RpcCall<u32> {
        RpcCall::streaming(stream::iter(events))
    }

    #[tokio::test]
    async fn test_unary_emits_one_value_then_completes() {
        let mut stream = bridge(|| RpcCall::unary(async { Ok(7_u32) }));

        assert_eq!(stream.next().await.unwrap().unwrap(), 7);
        assert!(stream.next().await.is_none());
        // Stays exhausted.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unary_rejection_is_terminal() {
        let mut stream = bridge(|| {
            RpcCall::unary(async {
                Err::<u32, _>(RpcError::new(StatusCode::FailedPrecondition, "not ready").into())
            })
        });

        let error = stream.next().await.unwrap().unwrap_err();
        assert_eq!(error.as_rpc().unwrap().code, StatusCode::FailedPrecondition);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_streaming_emits_all_values_then_completes() {
        let mut stream = bridge(|| {
            streaming_call(vec![
                StreamEvent::Data(Some(1)),
                StreamEvent::Data(Some(2)),
                StreamEvent::Data(Some(3)),
                StreamEvent::Status(Status::ok()),
            ])
        });

        let mut values = Vec::new();
        while let Some(item) = stream.next().await {
            values.push(item.unwrap());
        }
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_streaming_error_event_is_terminal() {
        let mut stream = bridge(|| {
            streaming_call(vec![
                StreamEvent::Data(Some(1)),
                StreamEvent::Error(RpcError::new(StatusCode::Unavailable, "gone")),
            ])
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        let error = stream.next().await.unwrap().unwrap_err();
        assert_eq!(error.as_rpc().unwrap().code, StatusCode::Unavailable);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_payload_suppresses_later_events() {
        let mut stream = bridge(|| {
            streaming_call(vec![
                StreamEvent::Data(Some(1)),
                StreamEvent::Data(None),
                StreamEvent::Data(Some(2)),
                StreamEvent::Status(Status::ok()),
            ])
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        assert_eq!(
            stream.next().await.unwrap().unwrap_err(),
            CallError::MissingPayload
        );
        // The later data event and OK status never surface.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_non_ok_status_without_error_event_is_reported() {
        let mut stream = bridge(|| {
            streaming_call(vec![
                StreamEvent::Data(Some(1)),
                StreamEvent::Status(Status::new(StatusCode::Internal, "trailer only")),
            ])
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        match stream.next().await.unwrap().unwrap_err() {
            CallError::IncompleteTermination(status) => {
                assert_eq!(status.code, StatusCode::Internal);
            }
            other => panic!("expected IncompleteTermination, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_event_stream_completes() {
        let mut stream = bridge(|| streaming_call(vec![StreamEvent::Data(Some(5))]));

        assert_eq!(stream.next().await.unwrap().unwrap(), 5);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_factory_runs_once_per_subscription() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut stream = bridge(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            RpcCall::unary(async { Ok(1_u32) })
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0, "factory must be lazy");
        while stream.next().await.is_some() {}
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resubscribe_restarts_the_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut stream = bridge(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            RpcCall::unary(async { Ok(1_u32) })
        });

        while stream.next().await.is_some() {}
        stream.resubscribe();
        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
