//! Error Taxonomy
//!
//! Two layers of errors flow through the client core:
//!
//! - [`RpcError`] is the structurally complete error shape produced by the
//!   RPC layer: a status code, a message, and optional metadata. It is the
//!   only error kind a retry policy is ever consulted about.
//! - [`CallError`] is what stream consumers observe. Besides wrapping an
//!   [`RpcError`], it covers failures the bridge synthesizes itself
//!   (missing payloads, unreported terminations) and failures that do not
//!   carry the RPC error shape at all. None of those are ever retried.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::status::{Metadata, Status, StatusCode};

/// An RPC-level failure: status code, message, and optional metadata.
///
/// # Example
///
/// ```
/// use streamrpc_common::{RpcError, StatusCode};
///
/// let error = RpcError::new(StatusCode::FailedPrecondition, "not ready")
///     .with_metadata("key", "value");
/// assert_eq!(error.metadata.get("key").map(String::as_str), Some("value"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Status code reported by the server or transport
    pub code: StatusCode,
    /// Human-readable error message
    pub message: String,
    /// Trailing metadata, if any
    #[serde(default)]
    pub metadata: Metadata,
}

impl RpcError {
    /// Creates an RPC error with empty metadata.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        RpcError {
            code,
            message: message.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attaches a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// A terminal call failure as observed by stream consumers.
///
/// Only the [`Rpc`](CallError::Rpc) variant is eligible for retry
/// evaluation; every other variant terminates the stream without the retry
/// policy being consulted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// RPC-level failure from the server or transport
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A data event arrived without a payload; the call contract is broken
    #[error("response payload is missing")]
    MissingPayload,

    /// The stream ended with a non-OK trailing status but no error event
    #[error("stream ended without an error event: {0}")]
    IncompleteTermination(Status),

    /// A failure that does not carry the RPC error shape
    #[error("transport error: {0}")]
    Transport(String),
}

impl CallError {
    /// Returns the inner [`RpcError`] if this failure carries the RPC error
    /// shape.
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            CallError::Rpc(error) => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CallError>;
