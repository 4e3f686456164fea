//! Single-table storage engines.
//!
//! A [`Storage`] engine holds opaque JSON text under string IDs. It knows
//! nothing about what the text means; the [`Store`](crate::Store) layer does
//! all parsing, validation and read-modify-write on top of it.
//!
//! Every method is an independent unit of work. Engines never group calls
//! into a transaction, so a read followed by a write from the same logical
//! operation can interleave with other callers.

mod error;
#[cfg(feature = "fjall")]
mod lsm;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use async_trait::async_trait;

use crate::config::{Backend, StoreConfig};
use crate::logging::debug;

pub use error::StorageError;
#[cfg(feature = "fjall")]
pub use lsm::FjallStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

/// Name of the single table (or keyspace) holding every entry.
pub const TABLE_NAME: &str = "json";

/// One row as the engine returns it: the ID and the serialized value text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub id: String,
    pub raw: String,
}

impl RawEntry {
    pub fn new(id: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw: raw.into(),
        }
    }
}

/// Keyed single-table storage capability.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the table if it does not exist. Safe to call repeatedly.
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Point lookup by ID.
    async fn get(&self, id: &str) -> Result<Option<String>, StorageError>;

    /// Insert or fully replace the text stored under `id`.
    async fn put(&self, id: &str, raw: &str) -> Result<(), StorageError>;

    /// Remove `id`. Removing a missing ID is not an error.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// Every row, in the engine's native enumeration order.
    async fn scan_all(&self) -> Result<Vec<RawEntry>, StorageError>;

    /// Remove every row.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Release the engine. Later calls fail with [`StorageError::Closed`].
    async fn close(&self) -> Result<(), StorageError>;
}

/// Open the engine selected by `config`.
pub async fn open(config: &StoreConfig) -> Result<Box<dyn Storage>, StorageError> {
    debug!(path = %config.path.display(), backend = %config.backend, "opening storage");

    match config.backend {
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => Ok(Box::new(SqliteStorage::open(&config.path).await?)),
        #[cfg(not(feature = "sqlite"))]
        Backend::Sqlite => Err(StorageError::Unavailable("sqlite")),
        #[cfg(feature = "fjall")]
        Backend::Fjall => Ok(Box::new(FjallStorage::open(&config.path)?)),
        #[cfg(not(feature = "fjall"))]
        Backend::Fjall => Err(StorageError::Unavailable("fjall")),
        Backend::Memory => Ok(Box::new(MemoryStorage::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_backend() -> Result<(), StorageError> {
        let config = StoreConfig::default().with_backend(Backend::Memory);
        let storage = open(&config).await?;
        storage.ensure_schema().await?;
        storage.put("a", "1").await?;
        assert_eq!(storage.get("a").await?, Some("1".to_string()));
        Ok(())
    }

    #[cfg(not(feature = "fjall"))]
    #[tokio::test]
    async fn test_open_compiled_out_backend() {
        let config = StoreConfig::default().with_backend(Backend::Fjall);
        let result = open(&config).await;
        assert!(matches!(result, Err(StorageError::Unavailable("fjall"))));
    }
}
