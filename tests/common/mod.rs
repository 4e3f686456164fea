//! Common test utilities and fixtures.
//!
//! Stores over each storage engine plus a storage double that fails every
//! call, used to exercise the swallowed-error paths.

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use json_kv::storage::{MemoryStorage, RawEntry, Storage, StorageError};
use json_kv::{Backend, Store, StoreConfig};
use tempfile::TempDir;

// =============================================================================
// Store Fixtures
// =============================================================================

/// Store over a fresh in-memory engine.
pub async fn memory_store() -> anyhow::Result<Store> {
    Ok(Store::with_storage(Box::new(MemoryStorage::new())).await?)
}

/// Store whose every storage call sleeps for `latency` first.
pub async fn slow_store(latency: Duration) -> anyhow::Result<Store> {
    Ok(Store::with_storage(Box::new(MemoryStorage::with_latency(latency))).await?)
}

/// Store backed by a storage engine that fails every data call.
pub async fn failing_store() -> anyhow::Result<Store> {
    Ok(Store::with_storage(Box::new(FailingStorage)).await?)
}

/// A store opened through [`StoreConfig`] inside its own temporary directory.
pub struct TestStore {
    pub store: Store,
    pub dir: TempDir,
}

impl TestStore {
    pub async fn open(backend: Backend, file_name: &str) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let config = StoreConfig::new(dir.path().join(file_name)).with_backend(backend);
        let store = Store::open(&config).await?;
        Ok(Self { store, dir })
    }
}

// =============================================================================
// Storage Doubles
// =============================================================================

/// Accepts schema creation, then fails every read, write and scan.
pub struct FailingStorage;

fn outage() -> StorageError {
    StorageError::Io(std::io::Error::other("disk unplugged"))
}

#[async_trait]
impl Storage for FailingStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get(&self, _id: &str) -> Result<Option<String>, StorageError> {
        Err(outage())
    }

    async fn put(&self, _id: &str, _raw: &str) -> Result<(), StorageError> {
        Err(outage())
    }

    async fn delete(&self, _id: &str) -> Result<(), StorageError> {
        Err(outage())
    }

    async fn scan_all(&self) -> Result<Vec<RawEntry>, StorageError> {
        Err(outage())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Err(outage())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Holds fixed raw rows, some of which need not be valid JSON.
pub struct RawRowsStorage {
    pub rows: Vec<RawEntry>,
}

#[async_trait]
impl Storage for RawRowsStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.raw.clone()))
    }

    async fn put(&self, _id: &str, _raw: &str) -> Result<(), StorageError> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<(), StorageError> {
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<RawEntry>, StorageError> {
        Ok(self.rows.clone())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Ids of a list of entries, in order.
pub fn ids(entries: &[json_kv::Entry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.id.as_str()).collect()
}
