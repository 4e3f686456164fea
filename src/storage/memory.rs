//! In-process storage engine.
//!
//! Entries live in an ordered map, so scans enumerate in ID order. Nothing
//! survives the process. An optional per-call latency makes the suspension
//! point between the read and the write of a mutation observable, which is
//! how the lost-update behaviour is reproduced in tests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{RawEntry, Storage, StorageError};
use crate::logging::trace;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<String, String>,
    closed: bool,
}

/// In-memory storage implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    table: Mutex<Table>,
    latency: Option<Duration>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before it touches the table.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            table: Mutex::default(),
            latency: Some(latency),
        }
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut Table) -> T) -> Result<T, StorageError> {
        let mut table = self.table.lock();
        if table.closed {
            return Err(StorageError::Closed);
        }
        Ok(f(&mut table))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.with_table(|_| ())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, StorageError> {
        self.pause().await;
        trace!(id = id, "memory get");
        self.with_table(|table| table.rows.get(id).cloned())
    }

    async fn put(&self, id: &str, raw: &str) -> Result<(), StorageError> {
        self.pause().await;
        trace!(id = id, len = raw.len(), "memory put");
        self.with_table(|table| {
            table.rows.insert(id.to_string(), raw.to_string());
        })
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.pause().await;
        self.with_table(|table| {
            table.rows.remove(id);
        })
    }

    async fn scan_all(&self) -> Result<Vec<RawEntry>, StorageError> {
        self.pause().await;
        self.with_table(|table| {
            table
                .rows
                .iter()
                .map(|(id, raw)| RawEntry::new(id.as_str(), raw.as_str()))
                .collect()
        })
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.pause().await;
        self.with_table(|table| table.rows.clear())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.with_table(|table| {
            table.rows.clear();
            table.closed = true;
        })
    }
}
