//! JSON value store module.
//!
//! This module interprets the opaque text held by a [`Storage`](crate::storage::Storage)
//! engine as JSON values and provides typed reads, writes, numeric and array
//! mutation, full-scan views, backup and name-based dispatch.

mod backup;
mod dispatch;
mod error;
mod ops;
mod store;
mod types;
mod validate;

pub use backup::{BACKUP_PREFIX, default_backup_name};
pub use error::{KvError, KvResult};
pub use ops::{ALIASES, Operation, Param};
pub use store::Store;
pub use types::{BackupOutcome, Entry, MathOperator, ValueType};
