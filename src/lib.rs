//! JSON key-value store over an embedded single-table storage engine.
//!
//! Values are arbitrary JSON documents kept under unique string IDs. On top
//! of get/set/delete the store adds numeric mutation, array mutation,
//! prefix/suffix queries, a full dump to one JSON object and file backups.
//!
//! # Quick Start
//!
//! ```ignore
//! use json_kv::prelude::*;
//! use serde_json::json;
//!
//! let store = Store::open(&StoreConfig::new("./db.sqlite")).await?;
//!
//! store.set("user1", &json!({"name": "ada"})).await?;
//! store.add("visits", 1.0).await?;          // creates the counter at 1
//! store.push("tags", "rust").await?;        // creates ["rust"]
//!
//! // Aliases resolve to the same operation.
//! let value = store.call("fetch", &[json!("user1")]).await?;
//!
//! store.close().await?;
//! ```
//!
//! # Modules
//!
//! - [`kv`] - The value store, validation, aliases and dispatch
//! - [`storage`] - Storage capability trait and engines
//! - [`config`] - Store configuration (TOML)
//!
//! # Feature Flags
//!
//! - `sqlite` - SQLite storage engine (enabled by default)
//! - `fjall` - fjall LSM storage engine
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `full` - Enable all features

pub mod config;
pub mod kv;
mod logging;
pub mod prelude;
pub mod storage;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use config::{Backend, ConfigError, StoreConfig};
pub use kv::{BackupOutcome, Entry, KvError, MathOperator, Operation, Store, ValueType};
pub use storage::{Storage, StorageError};

/// Package name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
