//! The value store: typed JSON semantics over a [`Storage`] engine.

// Swallowed storage errors are only read by the log macros.
#![cfg_attr(not(feature = "logging"), allow(unused_variables))]

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::logging::{debug, error, info, trace, warn};
use crate::storage::{self, Storage, StorageError};

use super::error::{KvError, KvResult};
use super::types::{Entry, MathOperator, ValueType};
use super::validate;

/// A JSON key-value store.
///
/// Values are any JSON document stored under a caller-chosen string ID. On
/// top of plain `get`/`set`/`delete` the store offers numeric mutation
/// (`add`, `subtract`, `math`), array mutation (`push`, `pull`) and
/// full-scan views (`all`, `filter`, `starts_with`, `to_json`, ...).
///
/// # Example
///
/// ```ignore
/// use json_kv::{Store, StoreConfig};
/// use serde_json::json;
///
/// let store = Store::open(&StoreConfig::new("./db.sqlite")).await?;
///
/// store.set("user1", &json!({"name": "ada"})).await?;
/// store.add("visits", 1.0).await?;
/// store.push("tags", "rust").await?;
///
/// let users = store.starts_with("user").await?;
/// store.close().await?;
/// ```
///
/// # Errors
///
/// Operations return [`KvError`] for invalid input or a stored value of the
/// wrong type. Failures of the storage engine itself are not returned: reads
/// report the value as absent, boolean operations report `false`, and writes
/// report `None`. A storage outage therefore looks like "not found" to most
/// read paths.
///
/// # Concurrency
///
/// `add`, `subtract`, `math`, `push` and `pull` each read the current value,
/// compute the new one and write it back as two separate storage calls. Two
/// concurrent mutations of the same key can both read the old value, and the
/// later write wins (lost update). Callers that need atomic counters must
/// serialize access themselves.
pub struct Store {
    storage: Box<dyn Storage>,
}

impl Store {
    /// Open the storage engine described by `config` and ensure its table.
    pub async fn open(config: &StoreConfig) -> crate::Result<Self> {
        let storage = storage::open(config).await?;
        let store = Self::with_storage(storage).await?;
        info!(path = %config.path.display(), backend = %config.backend, "store opened");
        Ok(store)
    }

    /// Wrap an already opened storage engine.
    pub async fn with_storage(storage: Box<dyn Storage>) -> Result<Self, StorageError> {
        storage.ensure_schema().await?;
        Ok(Self { storage })
    }

    /// Release the storage engine. Consuming `self` guarantees nothing runs
    /// after close and that close runs once.
    pub async fn close(self) -> Result<(), StorageError> {
        if let Err(e) = self.storage.close().await {
            error!(error = %e, "close failed");
            return Err(e);
        }
        info!("store closed");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Basic reads and writes
    // ---------------------------------------------------------------------

    /// Value stored under `key`, or `None` if absent or unreadable.
    pub async fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let key = validate::key(key)?;
        Ok(self.read(key).await)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Returns the stored JSON, or `None` if serialization or the write
    /// failed.
    pub async fn set<T>(&self, key: &str, value: &T) -> KvResult<Option<Value>>
    where
        T: Serialize + ?Sized,
    {
        let key = validate::key(key)?;
        debug!(key = key, "set");
        let Some(value) = to_value(key, value) else {
            return Ok(None);
        };
        Ok(self.write(key, value).await)
    }

    /// Remove `key`. `false` if it did not exist or the delete failed.
    pub async fn delete(&self, key: &str) -> KvResult<bool> {
        let key = validate::key(key)?;
        if !self.has(key).await? {
            return Ok(false);
        }
        match self.storage.delete(key).await {
            Ok(()) => {
                debug!(key = key, "deleted");
                Ok(true)
            }
            Err(e) => {
                warn!(key = key, error = %e, "delete failed");
                Ok(false)
            }
        }
    }

    /// Remove every entry. `false` if the storage call failed.
    pub async fn delete_all(&self) -> bool {
        match self.storage.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "clear failed");
                false
            }
        }
    }

    /// Whether an entry exists under `key`. Storage errors read as `false`.
    pub async fn has(&self, key: &str) -> KvResult<bool> {
        let key = validate::key(key)?;
        match self.storage.get(key).await {
            Ok(row) => Ok(row.is_some()),
            Err(e) => {
                warn!(key = key, error = %e, "existence check failed, reporting absent");
                Ok(false)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Numeric mutation
    // ---------------------------------------------------------------------

    /// Add `amount` to the number under `key`.
    ///
    /// A missing or non-numeric value counts as `0`, so `add` creates
    /// counters on first use. Returns the new number, or `None` if the write
    /// failed.
    pub async fn add(&self, key: &str, amount: f64) -> KvResult<Option<f64>> {
        let key = validate::key(key)?;
        let amount = validate::amount(amount)?;

        let current = self.read(key).await.as_ref().and_then(Value::as_f64);
        let next = current.unwrap_or(0.0) + amount;
        trace!(key = key, current = ?current, next = next, "add");

        Ok(self.write_number(key, next).await)
    }

    /// Subtract `amount` from the number under `key`.
    ///
    /// Unlike [`add`](Self::add), the stored value must already be a number:
    /// a missing or non-numeric value fails with [`KvError::NotANumber`].
    pub async fn subtract(&self, key: &str, amount: f64) -> KvResult<Option<f64>> {
        let key = validate::key(key)?;
        let amount = validate::amount(amount)?;

        let Some(current) = self.read(key).await.as_ref().and_then(Value::as_f64) else {
            return Err(KvError::NotANumber(key.to_string()));
        };
        let next = current - amount;
        trace!(key = key, current = current, next = next, "subtract");

        Ok(self.write_number(key, next).await)
    }

    /// Apply `operator` (`+ - * / %`) with `amount` to the number under `key`.
    ///
    /// The stored value must already be a number. Division and remainder by
    /// zero are not errors: they produce infinity or NaN, which JSON stores
    /// as `null`. The returned value is the raw float result.
    pub async fn math(&self, key: &str, amount: f64, operator: &str) -> KvResult<Option<f64>> {
        let key = validate::key(key)?;
        let amount = validate::amount(amount)?;
        let operator: MathOperator = operator.parse()?;

        let Some(current) = self.read(key).await.as_ref().and_then(Value::as_f64) else {
            return Err(KvError::NotANumber(key.to_string()));
        };
        let next = operator.apply(current, amount);
        trace!(key = key, operator = %operator, current = current, next = next, "math");

        Ok(self.write_number(key, next).await)
    }

    // ---------------------------------------------------------------------
    // Array mutation
    // ---------------------------------------------------------------------

    /// Append `element` to the array under `key`.
    ///
    /// A missing or non-array value starts from an empty array. Returns the
    /// new array, or `None` if the write failed.
    pub async fn push<T>(&self, key: &str, element: &T) -> KvResult<Option<Vec<Value>>>
    where
        T: Serialize + ?Sized,
    {
        let key = validate::key(key)?;
        let Some(element) = to_value(key, element) else {
            return Ok(None);
        };

        let mut items = match self.read(key).await {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        items.push(element);
        trace!(key = key, len = items.len(), "push");

        Ok(self.write_array(key, items).await)
    }

    /// Remove the first occurrence of `element` from the array under `key`.
    ///
    /// The stored value must already be an array, otherwise this fails with
    /// [`KvError::NotAnArray`]. Only scalars (null, booleans, numbers,
    /// strings) are matched; an array or object element never matches an
    /// item, even one with identical content. The array is written back even
    /// when nothing was removed.
    ///
    /// `element` is a [`Value`] rather than any `Serialize` type: serializing
    /// a NaN or infinite float yields `null`, which would then remove a stored
    /// `null` that was never asked for.
    pub async fn pull(&self, key: &str, element: &Value) -> KvResult<Option<Vec<Value>>> {
        let key = validate::key(key)?;

        let Some(Value::Array(mut items)) = self.read(key).await else {
            return Err(KvError::NotAnArray(key.to_string()));
        };
        if let Some(index) = items.iter().position(|item| strict_equals(item, element)) {
            items.remove(index);
        }
        trace!(key = key, len = items.len(), "pull");

        Ok(self.write_array(key, items).await)
    }

    // ---------------------------------------------------------------------
    // Queries and views
    // ---------------------------------------------------------------------

    /// Type tag of the value under `key`; [`ValueType::Undefined`] if absent.
    pub async fn type_of(&self, key: &str) -> KvResult<ValueType> {
        let key = validate::key(key)?;
        Ok(ValueType::of(self.read(key).await.as_ref()))
    }

    /// Number of entries, counted by a full scan.
    pub async fn size(&self) -> usize {
        self.all().await.len()
    }

    /// Every entry in storage scan order.
    ///
    /// If the scan fails or any row holds unparseable text, the whole result
    /// is empty.
    pub async fn all(&self) -> Vec<Entry> {
        let rows = match self.storage.scan_all().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "scan failed, reporting no entries");
                return Vec::new();
            }
        };

        let entries: Result<Vec<Entry>, serde_json::Error> = rows
            .into_iter()
            .map(|row| Ok(Entry::new(row.id, serde_json::from_str(&row.raw)?)))
            .collect();

        entries.unwrap_or_else(|e| {
            warn!(error = %e, "unparseable row, reporting no entries");
            Vec::new()
        })
    }

    /// Entries for which `predicate` returns `true`, in scan order.
    pub async fn filter<F>(&self, mut predicate: F) -> Vec<Entry>
    where
        F: FnMut(&Entry) -> bool,
    {
        self.all()
            .await
            .into_iter()
            .filter(|entry| predicate(entry))
            .collect()
    }

    /// Entries whose ID starts with `prefix`.
    pub async fn starts_with(&self, prefix: &str) -> KvResult<Vec<Entry>> {
        let prefix = validate::key(prefix)?;
        Ok(self.filter(|entry| entry.id.starts_with(prefix)).await)
    }

    /// Entries whose ID ends with `suffix`.
    pub async fn ends_with(&self, suffix: &str) -> KvResult<Vec<Entry>> {
        let suffix = validate::key(suffix)?;
        Ok(self.filter(|entry| entry.id.ends_with(suffix)).await)
    }

    /// All entries folded into one object mapping ID to value.
    pub async fn to_json(&self) -> Map<String, Value> {
        self.all()
            .await
            .into_iter()
            .map(|entry| (entry.id, entry.data))
            .collect()
    }

    /// The final entry in scan order.
    ///
    /// This is not necessarily the most recently written entry: the order is
    /// whatever the storage engine enumerates.
    pub async fn last(&self) -> Option<Entry> {
        self.all().await.pop()
    }

    // ---------------------------------------------------------------------
    // Aliases
    // ---------------------------------------------------------------------

    /// Alias of [`get`](Self::get).
    pub async fn fetch(&self, key: &str) -> KvResult<Option<Value>> {
        self.get(key).await
    }

    /// Alias of [`delete`](Self::delete).
    pub async fn del(&self, key: &str) -> KvResult<bool> {
        self.delete(key).await
    }

    /// Alias of [`subtract`](Self::subtract). This does not delete anything.
    pub async fn remove(&self, key: &str, amount: f64) -> KvResult<Option<f64>> {
        self.subtract(key, amount).await
    }

    /// Alias of [`delete_all`](Self::delete_all).
    pub async fn clear(&self) -> bool {
        self.delete_all().await
    }

    /// Alias of [`has`](Self::has).
    pub async fn exists(&self, key: &str) -> KvResult<bool> {
        self.has(key).await
    }

    /// Alias of [`has`](Self::has).
    pub async fn includes(&self, key: &str) -> KvResult<bool> {
        self.has(key).await
    }

    /// Alias of [`all`](Self::all).
    pub async fn get_all(&self) -> Vec<Entry> {
        self.all().await
    }

    /// Alias of [`all`](Self::all).
    pub async fn fetch_all(&self) -> Vec<Entry> {
        self.all().await
    }

    /// Alias of [`size`](Self::size).
    pub async fn count(&self) -> usize {
        self.size().await
    }

    /// Alias of [`size`](Self::size).
    pub async fn length(&self) -> usize {
        self.size().await
    }

    // ---------------------------------------------------------------------
    // Storage access
    // ---------------------------------------------------------------------

    async fn read(&self, key: &str) -> Option<Value> {
        let raw = match self.storage.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = key, error = %e, "read failed, reporting absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "stored text is not JSON, reporting absent");
                None
            }
        }
    }

    async fn write(&self, key: &str, value: Value) -> Option<Value> {
        let raw = match serde_json::to_string(&value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key, error = %e, "serialization failed, nothing written");
                return None;
            }
        };
        match self.storage.put(key, &raw).await {
            Ok(()) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "write failed");
                None
            }
        }
    }

    async fn write_number(&self, key: &str, number: f64) -> Option<f64> {
        self.write(key, number_to_json(number)).await.map(|_| number)
    }

    async fn write_array(&self, key: &str, items: Vec<Value>) -> Option<Vec<Value>> {
        match self.write(key, Value::Array(items)).await? {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

fn to_value<T: Serialize + ?Sized>(key: &str, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key, error = %e, "value is not JSON-serializable, nothing written");
            None
        }
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// JSON form of a float: integral values become JSON integers, non-finite
/// values become `null`.
pub(crate) fn number_to_json(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        // Exact: |number| is integral and within the 53-bit mantissa.
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}

/// Scalar equality used by `pull`. Containers never compare equal.
pub(crate) fn strict_equals(item: &Value, element: &Value) -> bool {
    match (item, element) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_to_json() {
        assert_eq!(number_to_json(5.0), json!(5));
        assert_eq!(number_to_json(-3.0), json!(-3));
        assert_eq!(number_to_json(0.5), json!(0.5));
        assert_eq!(number_to_json(f64::INFINITY), Value::Null);
        assert_eq!(number_to_json(f64::NAN), Value::Null);
        assert_eq!(number_to_json(1e300), json!(1e300));
    }

    #[test]
    fn test_strict_equals_scalars() {
        assert!(strict_equals(&json!(1), &json!(1.0)));
        assert!(strict_equals(&json!("a"), &json!("a")));
        assert!(strict_equals(&json!(null), &json!(null)));
        assert!(!strict_equals(&json!(1), &json!("1")));
        assert!(!strict_equals(&json!(true), &json!(1)));
    }

    #[test]
    fn test_strict_equals_never_matches_containers() {
        assert!(!strict_equals(&json!([1]), &json!([1])));
        assert!(!strict_equals(&json!({"a": 1}), &json!({"a": 1})));
    }
}
