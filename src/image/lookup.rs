//! Typed lookups of required and optional tags.

use crate::error::ImageError;
use crate::format::{TagStore, TagValue};

pub(crate) fn require<'a>(store: &'a TagStore, key: &str) -> Result<&'a TagValue, ImageError> {
    store
        .get(key)
        .ok_or_else(|| ImageError::MissingTag(key.to_string()))
}

fn invalid(key: &str, value: &TagValue) -> ImageError {
    ImageError::InvalidTagValue {
        path: key.to_string(),
        value: value.to_string(),
    }
}

pub(crate) fn require_u64(store: &TagStore, key: &str) -> Result<u64, ImageError> {
    let value = require(store, key)?;
    value.as_u64().ok_or_else(|| invalid(key, value))
}

pub(crate) fn require_i64(store: &TagStore, key: &str) -> Result<i64, ImageError> {
    let value = require(store, key)?;
    value.as_i64().ok_or_else(|| invalid(key, value))
}

pub(crate) fn require_f64(store: &TagStore, key: &str) -> Result<f64, ImageError> {
    let value = require(store, key)?;
    value.as_f64().ok_or_else(|| invalid(key, value))
}

/// `Ok(None)` when the tag is absent, an error when present but not an
/// unsigned integer.
pub(crate) fn optional_u64(store: &TagStore, key: &str) -> Result<Option<u64>, ImageError> {
    match store.get(key) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| invalid(key, value)),
    }
}

/// Convert a dimension to `usize`.
pub(crate) fn to_usize(key: &str, value: u64) -> Result<usize, ImageError> {
    usize::try_from(value).map_err(|_| ImageError::InvalidTagValue {
        path: key.to_string(),
        value: value.to_string(),
    })
}
