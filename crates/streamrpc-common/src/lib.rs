//! streamrpc Common Types
//!
//! This crate provides the protocol-level types shared by the streamrpc
//! client core: status codes, the RPC error shape, and the tagged call
//! shapes handed over by a transport adapter.
//!
//! # Overview
//!
//! streamrpc normalizes two kinds of remote calls — a unary call that
//! settles with exactly one result, and a server-streaming call that pushes
//! a sequence of results — into a single stream abstraction. The transport
//! layer itself (connection setup, wire encoding, TLS) lives outside this
//! workspace; a transport adapter only needs to produce the types defined
//! here:
//!
//! - [`RpcCall`] — the tagged call shape ([`RpcCall::Unary`] or
//!   [`RpcCall::Streaming`])
//! - [`StreamEvent`] — one event of a streaming call (data, error, or
//!   trailing status)
//! - [`RpcError`] — status code, message, and optional metadata
//! - [`CallError`] — the error taxonomy observed by stream consumers
//!
//! # Example
//!
//! ```
//! use streamrpc_common::{RpcError, StatusCode};
//!
//! let error = RpcError::new(StatusCode::PermissionDenied, "token expired")
//!     .with_metadata("www-authenticate", "Bearer");
//! assert_eq!(error.code, StatusCode::PermissionDenied);
//! ```

pub mod protocol;

pub use protocol::*;
