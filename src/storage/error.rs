//! Error types for the storage engines.

use thiserror::Error;

/// Errors raised by a [`Storage`](super::Storage) engine.
///
/// These never reach callers of the value-level operations: the
/// [`Store`](crate::Store) converts them into absent values, `false` or a
/// failed backup outcome. They do surface from opening and closing a store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "fjall")]
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Stored text for '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("Storage engine is closed")]
    Closed,

    #[error("Blocking storage task failed: {0}")]
    Task(String),

    #[error("Storage backend '{0}' is not compiled into this build")]
    Unavailable(&'static str),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}
