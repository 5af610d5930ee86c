pub mod call;
pub mod error;
pub mod status;


pub use call::{RpcCall, StreamEvent};
pub use error::{CallError, Result, RpcError};
pub use status::{InvalidStatusCode, Metadata, Status, StatusCode};
