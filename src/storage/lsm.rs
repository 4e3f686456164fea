//! Storage engine backed by fjall.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};
use parking_lot::RwLock;

use super::{RawEntry, Storage, StorageError, TABLE_NAME};
use crate::logging::{debug, info, trace};

/// fjall-backed storage. Entries live in a single keyspace and scan in key
/// order. Every write is persisted before the call returns.
pub struct FjallStorage {
    db: RwLock<Option<fjall::Database>>,
    table: Keyspace,
    path: PathBuf,
}

impl FjallStorage {
    /// Open (or create) a fjall database directory at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "opening fjall storage");

        let db = fjall::Database::builder(&path).open()?;
        let table = db.keyspace(TABLE_NAME, KeyspaceCreateOptions::default)?;

        info!(path = %path.display(), "fjall storage opened");
        Ok(Self {
            db: RwLock::new(Some(db)),
            table,
            path,
        })
    }

    /// Database directory this storage was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        let db = self.db.read();
        let db = db.as_ref().ok_or(StorageError::Closed)?;
        db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.db.read().is_none() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

fn decode(id: &str, bytes: &[u8]) -> Result<String, StorageError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| StorageError::Encoding(id.to_string()))
}

#[async_trait]
impl Storage for FjallStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        let db = self.db.read();
        let db = db.as_ref().ok_or(StorageError::Closed)?;
        let _ = db.keyspace(TABLE_NAME, KeyspaceCreateOptions::default)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, StorageError> {
        self.ensure_open()?;
        trace!(id = id, "fjall get");
        self.table
            .get(id)?
            .map(|bytes| decode(id, &bytes))
            .transpose()
    }

    async fn put(&self, id: &str, raw: &str) -> Result<(), StorageError> {
        self.ensure_open()?;
        trace!(id = id, len = raw.len(), "fjall put");
        self.table.insert(id, raw.as_bytes())?;
        self.persist()
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.table.remove(id)?;
        self.persist()
    }

    async fn scan_all(&self) -> Result<Vec<RawEntry>, StorageError> {
        self.ensure_open()?;
        let mut rows = Vec::new();
        for kv in self.table.iter() {
            let key = kv.key()?;
            let id = decode("<key>", &key)?;
            // Removed between the key scan and the lookup.
            let Some(value) = self.table.get(&key)? else {
                continue;
            };
            let raw = decode(&id, &value)?;
            rows.push(RawEntry { id, raw });
        }
        Ok(rows)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.ensure_open()?;
        // Skip any keys that fail to read, like a partial scan would.
        let keys: Vec<Vec<u8>> = self
            .table
            .iter()
            .filter_map(|kv| kv.key().ok().map(|k| k.to_vec()))
            .collect();
        trace!(key_count = keys.len(), "clearing keyspace");
        for key in keys {
            self.table.remove(&key)?;
        }
        self.persist()
    }

    async fn close(&self) -> Result<(), StorageError> {
        let db = self.db.write().take().ok_or(StorageError::Closed)?;
        db.persist(PersistMode::SyncAll)?;
        info!(path = %self.path.display(), "fjall storage closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_and_scan_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FjallStorage::open(dir.path())?;

        storage.put("user2", "2").await?;
        storage.put("admin", "0").await?;
        storage.put("user1", "1").await?;

        assert_eq!(storage.get("admin").await?, Some("0".to_string()));
        let ids: Vec<String> = storage
            .scan_all()
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(ids, vec!["admin", "user1", "user2"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_and_delete() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FjallStorage::open(dir.path())?;

        storage.put("a", "1").await?;
        storage.put("b", "2").await?;
        storage.delete("a").await?;
        storage.delete("missing").await?;
        assert_eq!(storage.scan_all().await?, vec![RawEntry::new("b", "2")]);

        storage.clear().await?;
        assert!(storage.scan_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FjallStorage::open(dir.path())?;
        storage.close().await?;

        assert!(matches!(storage.put("a", "1").await, Err(StorageError::Closed)));
        Ok(())
    }
}
