//! Call Shapes
//!
//! A transport adapter hands a remote call over as an [`RpcCall`]: either a
//! unary future that settles with exactly one result, or a stream of
//! [`StreamEvent`]s pushed by the server. The shape is tagged explicitly by
//! the adapter that built the call; nothing downstream guesses at it.

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{Future, Stream};
use std::fmt;

use super::error::{Result, RpcError};
use super::status::Status;

/// One event produced by a streaming call.
///
/// A well-formed streaming call pushes zero or more `Data` events followed
/// by exactly one terminal event: an `Error`, or a trailing `Status`. A
/// `Data(None)` payload is a contract violation that the bridge reports as
/// [`CallError::MissingPayload`](super::error::CallError::MissingPayload).
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<T> {
    /// A response message, or `None` if the transport delivered a data
    /// event without a payload
    Data(Option<T>),
    /// Explicit error event; terminal
    Error(RpcError),
    /// Trailing status; terminal
    Status(Status),
}

/// A remote call as handed over by the transport adapter.
///
/// The variant is the adapter's statement of which call shape it issued:
///
/// - [`Unary`](RpcCall::Unary): settles with exactly one result or exactly
///   one error.
/// - [`Streaming`](RpcCall::Streaming): pushes [`StreamEvent`]s until a
///   terminal event.
///
/// Dropping an `RpcCall` drops the underlying future or event stream, which
/// releases the transport resources held by the in-flight call.
///
/// # Example
///
/// ```
/// use streamrpc_common::{RpcCall, Result};
///
/// let call: RpcCall<u32> = RpcCall::unary(async { Result::Ok(42) });
/// assert!(matches!(call, RpcCall::Unary(_)));
/// ```
pub enum RpcCall<T> {
    /// A deferred single result
    Unary(BoxFuture<'static, Result<T>>),
    /// A server-push sequence of events
    Streaming(BoxStream<'static, StreamEvent<T>>),
}

impl<T> RpcCall<T> {
    /// Wraps a future as a unary call.
    pub fn unary<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        RpcCall::Unary(Box::pin(future))
    }

    /// Wraps an event stream as a streaming call.
    pub fn streaming<S>(stream: S) -> Self
    where
        S: Stream<Item = StreamEvent<T>> + Send + 'static,
    {
        RpcCall::Streaming(Box::pin(stream))
    }
}

impl<T> fmt::Debug for RpcCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcCall::Unary(_) => f.write_str("RpcCall::Unary"),
            RpcCall::Streaming(_) => f.write_str("RpcCall::Streaming"),
        }
    }
}
