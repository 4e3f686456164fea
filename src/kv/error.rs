//! Error types for store operations.

use thiserror::Error;

/// Validation failures raised by [`Store`](super::Store) operations.
///
/// These are always returned to the caller before (or instead of) any write.
/// Storage-engine failures are not represented here; the store converts them
/// into absent values or `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    #[error("No key specified")]
    InvalidKey,

    #[error("Amount must be a number")]
    InvalidAmount,

    #[error("Data cannot be infinity")]
    InvalidData,

    #[error("No value specified")]
    MissingValue,

    #[error("No element specified")]
    MissingElement,

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Stored value for '{0}' must be a number")]
    NotANumber(String),

    #[error("Stored value for '{0}' must be an array")]
    NotAnArray(String),

    #[error("Filter must be a function")]
    InvalidFilter,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

/// A [`Result`] alias for store operations.
pub type KvResult<T> = std::result::Result<T, KvError>;
