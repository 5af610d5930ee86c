//! streamrpc Client Core
//!
//! This crate turns remote-procedure calls — unary or server-streaming —
//! into one uniform, cancellable asynchronous stream, with optional
//! automatic retry governed by a pluggable, backoff-aware policy.
//!
//! # Overview
//!
//! A transport adapter produces an [`RpcCall`](streamrpc_common::RpcCall)
//! per attempt; everything transport-level (connections, wire encoding,
//! TLS) stays behind that seam. This crate supplies the rest:
//!
//! - [`bridge`] — adapts both call shapes into a [`futures::Stream`] of
//!   results with a single termination contract: values, then either one
//!   terminal error or completion, never both.
//! - [`RetryPolicy`] — bundles a retry predicate, a maximum retry count,
//!   and an asynchronous before-retry gate.
//! - [`exponential_backoff`] / [`with_exponential_delay`] — deterministic,
//!   capped exponential delay for the gate.
//! - [`retry`] — a stream transformer that resubscribes the call per the
//!   policy, or propagates the error as terminal.
//!
//! Cancellation is dropping the stream: in-flight calls, gates, and backoff
//! timers are released with it, and no late event can surface.
//!
//! # Example
//!
//! ```
//! use futures::StreamExt;
//! use std::time::Duration;
//! use streamrpc_client::{bridge, RetryPolicy};
//! use streamrpc_common::{Result, RpcCall};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = bridge(|| RpcCall::unary(async { Result::Ok("pong".to_string()) }));
//! let mut stream = source.retry(RetryPolicy::exponential(Duration::from_millis(500), None));
//!
//! while let Some(item) = stream.next().await {
//!     match item {
//!         Ok(response) => println!("response: {response}"),
//!         Err(error) => eprintln!("call failed: {error}"),
//!     }
//! }
//! # }
//! ```

pub mod backoff;
pub mod bridge;
pub mod policy;
pub mod retry;

pub use backoff::{exponential_backoff, with_exponential_delay, DEFAULT_MAX_DELAY};
pub use bridge::{bridge, CallFactory, CallStream, Resubscribe};
pub use policy::{immediate_gate, BeforeRetry, GateFuture, GateResult, RetryPolicy, RetryPredicate};
pub use retry::{retry, RetryStream};
