//! Unified error type for the json-kv library.
//!
//! This module provides a single [`Error`] type that encompasses all errors
//! that can occur in the library, making it easier to handle errors in
//! application code.

use thiserror::Error;

use crate::config::ConfigError;
use crate::kv::KvError;
use crate::storage::StorageError;

/// Unified error type for all json-kv operations.
///
/// # Example
///
/// ```ignore
/// use json_kv::{Result, Store, StoreConfig};
///
/// async fn bump() -> Result<()> {
///     let store = Store::open(&StoreConfig::new("./db.sqlite")).await?;
///     store.add("visits", 1.0).await?;
///     store.close().await?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input or wrongly typed stored value.
    #[error(transparent)]
    Kv(#[from] KvError),

    /// Storage engine failure while opening or closing.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration file could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a validation error.
    pub fn is_kv(&self) -> bool {
        matches!(self, Self::Kv(_))
    }

    /// Returns `true` if this is a storage engine error.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
