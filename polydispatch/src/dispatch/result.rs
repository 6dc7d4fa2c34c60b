//! Dispatch errors.

use thiserror::Error;

/// Failure of a single call.
///
/// Always recoverable: the caller can fall back, retry with other
/// arguments, or propagate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    NoMatch(#[from] NoMatchError),
}

/// Error when no overload accepts the arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "no overload of `{function}` accepts ({}); candidates: {}",
    .arg_types.join(", "),
    .candidates.join(", ")
)]
pub struct NoMatchError {
    /// The function that was called.
    pub function: String,
    /// One description per argument: the first known type that accepts it,
    /// otherwise its Rust type name.
    pub arg_types: Vec<String>,
    /// Every candidate signature, in selection order.
    pub candidates: Vec<String>,
}

/// Result type for calls.
pub type DispatchResult<T> = Result<T, DispatchError>;
