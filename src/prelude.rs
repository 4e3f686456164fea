//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use json_kv::prelude::*;
//!
//! let store = Store::open(&StoreConfig::default()).await?;
//! store.push("queue", "job-1").await?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Store types
pub use crate::kv::{
    BackupOutcome, Entry, KvError, KvResult, MathOperator, Operation, Store, ValueType,
};

// Configuration
pub use crate::config::{Backend, StoreConfig};

// Storage engines
#[cfg(feature = "fjall")]
pub use crate::storage::FjallStorage;
#[cfg(feature = "sqlite")]
pub use crate::storage::SqliteStorage;
pub use crate::storage::{MemoryStorage, Storage, StorageError};
