//! Status Codes and Trailing Status
//!
//! This module defines the canonical RPC status code set and the trailing
//! status delivered at the end of a streaming call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Key/value metadata (trailers) attached to errors and trailing statuses.
pub type Metadata = HashMap<String, String>;

/// Raised when a numeric status code has no known mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid status code: {0}")]
pub struct InvalidStatusCode(pub u32);

/// The canonical RPC status code set.
///
/// Codes are serialized as their numeric wire value (`Ok` = 0 through
/// `Unauthenticated` = 16). [`StatusCode::Ok`] is the only code that marks
/// a call as successful.
///
/// # Example
///
/// ```
/// use streamrpc_common::StatusCode;
///
/// assert!(StatusCode::Ok.is_ok());
/// assert_eq!(u32::from(StatusCode::PermissionDenied), 7);
/// assert_eq!(StatusCode::try_from(14), Ok(StatusCode::Unavailable));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum StatusCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl StatusCode {
    /// Returns `true` for the success code.
    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl From<StatusCode> for u32 {
    fn from(code: StatusCode) -> u32 {
        code as u32
    }
}

impl TryFrom<u32> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(code: u32) -> Result<Self, InvalidStatusCode> {
        let mapped = match code {
            0 => StatusCode::Ok,
            1 => StatusCode::Cancelled,
            2 => StatusCode::Unknown,
            3 => StatusCode::InvalidArgument,
            4 => StatusCode::DeadlineExceeded,
            5 => StatusCode::NotFound,
            6 => StatusCode::AlreadyExists,
            7 => StatusCode::PermissionDenied,
            8 => StatusCode::ResourceExhausted,
            9 => StatusCode::FailedPrecondition,
            10 => StatusCode::Aborted,
            11 => StatusCode::OutOfRange,
            12 => StatusCode::Unimplemented,
            13 => StatusCode::Internal,
            14 => StatusCode::Unavailable,
            15 => StatusCode::DataLoss,
            16 => StatusCode::Unauthenticated,
            other => return Err(InvalidStatusCode(other)),
        };
        Ok(mapped)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The trailing status of a streaming call.
///
/// A streaming call ends with exactly one terminal event: either an explicit
/// error event, or a trailing `Status`. A trailing status with
/// [`StatusCode::Ok`] marks successful completion; any other code means the
/// call ended without the transport raising an error event.
///
/// # Example
///
/// ```
/// use streamrpc_common::{Status, StatusCode};
///
/// let status = Status::new(StatusCode::Ok, "");
/// assert!(status.code.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// Status code reported by the server
    pub code: StatusCode,
    /// Human-readable status details
    pub message: String,
    /// Trailing metadata, if any
    #[serde(default)]
    pub metadata: Metadata,
}

impl Status {
    /// Creates a trailing status with empty metadata.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Status {
            code,
            message: message.into(),
            metadata: Metadata::new(),
        }
    }

    /// Creates the successful trailing status.
    pub fn ok() -> Self {
        Status::new(StatusCode::Ok, "")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}
