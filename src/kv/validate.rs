//! Input validation shared by every store operation.
//!
//! Runs before any storage access. Failures here are always surfaced.

use serde_json::Value;

use super::error::{KvError, KvResult};

/// A key (or ID pattern) must be non-empty.
pub(crate) fn key(key: &str) -> KvResult<&str> {
    if key.is_empty() {
        return Err(KvError::InvalidKey);
    }
    Ok(key)
}

/// An amount must be finite in either direction. NaN is accepted.
pub(crate) fn amount(amount: f64) -> KvResult<f64> {
    if amount.is_infinite() {
        return Err(KvError::InvalidData);
    }
    Ok(amount)
}

/// Untyped key argument: must be a non-empty string.
pub(crate) fn key_arg(arg: Option<&Value>) -> KvResult<&str> {
    match arg {
        Some(Value::String(k)) => key(k),
        _ => Err(KvError::InvalidKey),
    }
}

/// Untyped amount argument: must be a JSON number.
pub(crate) fn amount_arg(arg: Option<&Value>) -> KvResult<f64> {
    arg.and_then(Value::as_f64).ok_or(KvError::InvalidAmount)
}
