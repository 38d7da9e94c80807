//! Protocol-level error types.

use thiserror::Error;

/// A request the node understood and rejected.
///
/// Distinct from transport failures and timeouts: the node answered, and the
/// answer was an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Short machine-readable error code, e.g. `actNotFound`.
    pub code: String,
    /// Human-readable description from the node.
    pub message: String,
}
