//! Name-based dispatch over untyped JSON arguments.
//!
//! This is the entry point for callers that only have an operation name and
//! a list of JSON arguments (the CLI, scripting bridges). The name is
//! resolved through [`Operation::resolve`] first, so an alias runs exactly
//! the same code as its canonical operation, errors included.

use std::path::Path;

use serde_json::Value;

use crate::logging::debug;

use super::error::{KvError, KvResult};
use super::ops::Operation;
use super::store::{Store, number_to_json};
use super::types::{BackupOutcome, Entry};
use super::validate;

impl From<Entry> for Value {
    fn from(entry: Entry) -> Self {
        let mut object = serde_json::Map::new();
        object.insert("ID".to_string(), Value::String(entry.id));
        object.insert("data".to_string(), entry.data);
        Value::Object(object)
    }
}

fn entries(entries: Vec<Entry>) -> Value {
    Value::Array(entries.into_iter().map(Value::from).collect())
}

impl Store {
    /// Run the operation called `name` with positional JSON `args`.
    ///
    /// Returns `Ok(None)` where the typed operation reports an absent value.
    /// Missing arguments raise the same error a missing value raises in the
    /// typed API (`InvalidKey`, `MissingValue`, `InvalidAmount`, ...).
    pub async fn call(&self, name: &str, args: &[Value]) -> KvResult<Option<Value>> {
        let operation =
            Operation::resolve(name).ok_or_else(|| KvError::UnknownOperation(name.to_string()))?;
        debug!(name = name, operation = %operation, argc = args.len(), "dispatching");
        self.run(operation, args).await
    }

    /// Run a resolved operation with positional JSON `args`.
    pub async fn run(&self, operation: Operation, args: &[Value]) -> KvResult<Option<Value>> {
        let arg = |index: usize| args.get(index);

        match operation {
            Operation::Get => {
                let key = validate::key_arg(arg(0))?;
                self.get(key).await
            }
            Operation::Set => {
                let key = validate::key_arg(arg(0))?;
                let value = arg(1).ok_or(KvError::MissingValue)?;
                self.set(key, value).await
            }
            Operation::Add => {
                let key = validate::key_arg(arg(0))?;
                let amount = validate::amount_arg(arg(1))?;
                Ok(self.add(key, amount).await?.map(number_to_json))
            }
            Operation::Subtract => {
                let key = validate::key_arg(arg(0))?;
                let amount = validate::amount_arg(arg(1))?;
                Ok(self.subtract(key, amount).await?.map(number_to_json))
            }
            Operation::Math => {
                let key = validate::key_arg(arg(0))?;
                let amount = validate::amount_arg(arg(1))?;
                let operator = match arg(2) {
                    Some(Value::String(op)) => op.as_str(),
                    Some(other) => return Err(KvError::InvalidOperator(other.to_string())),
                    None => return Err(KvError::InvalidOperator("undefined".to_string())),
                };
                Ok(self.math(key, amount, operator).await?.map(number_to_json))
            }
            Operation::Push => {
                let key = validate::key_arg(arg(0))?;
                let element = arg(1).ok_or(KvError::MissingElement)?;
                Ok(self.push(key, element).await?.map(Value::Array))
            }
            Operation::Pull => {
                let key = validate::key_arg(arg(0))?;
                let element = arg(1).ok_or(KvError::MissingElement)?;
                Ok(self.pull(key, element).await?.map(Value::Array))
            }
            Operation::Delete => {
                let key = validate::key_arg(arg(0))?;
                Ok(Some(Value::Bool(self.delete(key).await?)))
            }
            Operation::DeleteAll => Ok(Some(Value::Bool(self.delete_all().await))),
            Operation::Has => {
                let key = validate::key_arg(arg(0))?;
                Ok(Some(Value::Bool(self.has(key).await?)))
            }
            Operation::All => Ok(Some(entries(self.all().await))),
            Operation::Type => {
                let key = validate::key_arg(arg(0))?;
                let tag = self.type_of(key).await?;
                Ok(Some(Value::String(tag.as_str().to_string())))
            }
            Operation::Size => Ok(Some(Value::from(self.size().await))),
            // A JSON argument is never callable.
            Operation::Filter => Err(KvError::InvalidFilter),
            Operation::StartsWith => {
                let prefix = validate::key_arg(arg(0))?;
                Ok(Some(entries(self.starts_with(prefix).await?)))
            }
            Operation::EndsWith => {
                let suffix = validate::key_arg(arg(0))?;
                Ok(Some(entries(self.ends_with(suffix).await?)))
            }
            Operation::ToJson => Ok(Some(Value::Object(self.to_json().await))),
            Operation::Last => Ok(self.last().await.map(Value::from)),
            Operation::Backup => {
                let outcome = match arg(0) {
                    Some(Value::String(name)) if !name.is_empty() => {
                        self.backup(Some(Path::new(name))).await
                    }
                    Some(Value::String(_) | Value::Null | Value::Bool(false)) | None => {
                        self.backup(None).await
                    }
                    Some(Value::Number(n)) if n.as_f64() == Some(0.0) => self.backup(None).await,
                    Some(other) => BackupOutcome::failed(format!(
                        "backup filename must be a string, got {}",
                        other
                    )),
                };
                Ok(serde_json::to_value(outcome).ok())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_into_value() {
        let value = Value::from(Entry::new("a", json!([1, 2])));
        assert_eq!(value, json!({"ID": "a", "data": [1, 2]}));
    }
}
