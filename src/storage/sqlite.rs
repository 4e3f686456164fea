//! SQLite storage engine.
//!
//! The table layout is `json (ID TEXT PRIMARY KEY, json TEXT)`. Every call
//! runs on the blocking pool via `spawn_blocking` against one shared
//! connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use super::{RawEntry, Storage, StorageError};
use crate::logging::{debug, info, trace};

/// Path that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// SQLite-backed storage.
pub struct SqliteStorage {
    conn: Arc<Mutex<Option<Connection>>>,
    path: PathBuf,
}

impl SqliteStorage {
    /// Open (or create) the database at `path` and ensure the table exists.
    ///
    /// `:memory:` opens a private in-memory database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let in_memory = path.as_os_str() == IN_MEMORY;

        if !in_memory
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let open_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StorageError> {
            if in_memory {
                return Ok(Connection::open_in_memory()?);
            }
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
            let conn = Connection::open_with_flags(&open_path, flags)?;
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
            Ok(conn)
        })
        .await??;

        let storage = Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        };
        storage.ensure_schema().await?;

        info!(path = %storage.path.display(), "SQLite storage opened");
        Ok(storage)
    }

    /// Database path this storage was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let conn = guard.as_ref().ok_or(StorageError::Closed)?;
            Ok(f(conn)?)
        })
        .await?
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.run(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS json (ID TEXT PRIMARY KEY, json TEXT)",
                [],
            )
        })
        .await?;
        debug!(path = %self.path.display(), "schema ensured");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, StorageError> {
        trace!(id = id, "sqlite get");
        let id = id.to_string();
        let row = self
            .run(move |conn| {
                conn.query_row("SELECT json FROM json WHERE ID = ?1", [&id], |row| {
                    row.get::<_, Option<String>>(0)
                })
                .optional()
            })
            .await?;

        // A NULL json column still marks an existing row.
        Ok(row.map(|raw| raw.unwrap_or_else(|| "null".to_string())))
    }

    async fn put(&self, id: &str, raw: &str) -> Result<(), StorageError> {
        trace!(id = id, len = raw.len(), "sqlite put");
        let id = id.to_string();
        let raw = raw.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO json (ID, json) VALUES (?1, ?2)",
                rusqlite::params![id, raw],
            )
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let id = id.to_string();
        self.run(move |conn| conn.execute("DELETE FROM json WHERE ID = ?1", [&id]))
            .await?;
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<RawEntry>, StorageError> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT ID, json FROM json WHERE ID IS NOT NULL")?;
            let rows = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    let raw: Option<String> = row.get(1)?;
                    Ok(RawEntry::new(id, raw.unwrap_or_else(|| "null".to_string())))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.run(|conn| conn.execute("DELETE FROM json", [])).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().take().ok_or(StorageError::Closed)?;
            conn.close().map_err(|(_, err)| StorageError::Sqlite(err))
        })
        .await??;

        info!(path = %self.path.display(), "SQLite storage closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_roundtrip() -> Result<(), StorageError> {
        let storage = SqliteStorage::open(IN_MEMORY).await?;
        storage.put("a", "{\"x\":1}").await?;

        assert_eq!(storage.get("a").await?, Some("{\"x\":1}".to_string()));
        assert_eq!(storage.get("b").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() -> Result<(), StorageError> {
        let storage = SqliteStorage::open(IN_MEMORY).await?;
        storage.put("a", "1").await?;
        storage.ensure_schema().await?;

        assert_eq!(storage.scan_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_keeps_single_row() -> Result<(), StorageError> {
        let storage = SqliteStorage::open(IN_MEMORY).await?;
        storage.put("a", "1").await?;
        storage.put("b", "2").await?;
        storage.put("a", "3").await?;

        let mut rows = storage.scan_all().await?;
        rows.sort_by(|l, r| l.id.cmp(&r.id));
        assert_eq!(rows, vec![RawEntry::new("a", "3"), RawEntry::new("b", "2")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_persists_across_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("db.sqlite");

        let storage = SqliteStorage::open(&path).await?;
        storage.put("kept", "true").await?;
        storage.close().await?;

        let reopened = SqliteStorage::open(&path).await?;
        assert_eq!(reopened.get("kept").await?, Some("true".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() -> Result<(), StorageError> {
        let storage = SqliteStorage::open(IN_MEMORY).await?;
        storage.close().await?;

        assert!(matches!(storage.get("a").await, Err(StorageError::Closed)));
        assert!(matches!(storage.close().await, Err(StorageError::Closed)));
        Ok(())
    }
}
