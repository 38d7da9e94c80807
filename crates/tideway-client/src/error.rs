//! Client error types.

use std::time::Duration;

use thiserror::Error;
use tideway_proto::ApiError;

/// Failure of one request/response call.
///
/// Timeouts, transport failures, and node-side rejections are distinct
/// variants so callers can branch without string matching. Engine-level
/// transaction outcomes never appear here; those are values, not errors.
#[derive(Debug, Error)]
pub enum CallError {
    /// No live connection to send through.
    #[error("not connected to any node")]
    NotConnected,

    /// The connection went away while the call was outstanding.
    #[error("connection closed while waiting for a response")]
    ConnectionClosed,

    /// No response arrived within the call timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The node answered with an error envelope.
    #[error("node rejected the request: {0}")]
    Api(#[from] ApiError),

    /// Request encoding or response decoding failed.
    #[error("codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
