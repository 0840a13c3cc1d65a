// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Typed readers over structured documents.
//!
//! A document is a `serde_json::Value` object — the generic structured value
//! this crate consumes from and produces for an external document-store
//! driver. Every `load` implementation reads its fields through the helpers
//! here, which encode the error policy of the model:
//!
//! - a **required** field that is absent or of the wrong type fails loudly
//!   with a [`LoadError`], so a partially-loaded aggregate is never used
//!   silently (a silently-defaulted field would corrupt the "freshly loaded
//!   means clean" invariant);
//! - an **optional** field that is absent (or `null`) reads as `None` and the
//!   caller applies its defined default — but a *present* value of the wrong
//!   type is still an error.

use crate::timestamp::Timestamp;
#[cfg(feature = "chrono")]
use crate::timestamp::date_from_number;
#[cfg(feature = "chrono")]
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

/// The object form of a structured document: storage keys to values.
pub type Document = serde_json::Map<String, Value>;

/// Error produced when loading a model from a malformed source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A required field is absent from the source document.
    Missing {
        /// The storage key of the absent field.
        key: String,
    },
    /// A field holds a value of an unexpected type.
    WrongType {
        /// The storage key of the offending field.
        key: String,
        /// What the model expected to find.
        expected: &'static str,
        /// What the document actually holds.
        actual: &'static str,
    },
    /// A map key could not be parsed into the model's key type.
    InvalidKey {
        /// The unparseable key, as it appears in the document.
        key: String,
    },
}

impl LoadError {
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        LoadError::Missing { key: key.into() }
    }

    pub(crate) fn wrong_type(key: impl Into<String>, expected: &'static str, value: &Value) -> Self {
        LoadError::WrongType {
            key: key.into(),
            expected,
            actual: type_name(value),
        }
    }

    pub(crate) fn invalid_key(key: impl Into<String>) -> Self {
        LoadError::InvalidKey { key: key.into() }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Missing { key } => write!(f, "required field {key:?} is missing"),
            LoadError::WrongType {
                key,
                expected,
                actual,
            } => write!(f, "field {key:?} holds a {actual} where a {expected} was expected"),
            LoadError::InvalidKey { key } => write!(f, "map key {key:?} could not be parsed"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Names the JSON type of a value, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Requires `value` to be a document (JSON object).
///
/// `key` names the field the value was read from, for the error message.
pub fn as_document<'a>(value: &'a Value, key: &str) -> Result<&'a Document, LoadError> {
    value
        .as_object()
        .ok_or_else(|| LoadError::wrong_type(key, "document", value))
}

/// Requires `value` to be an array of elements.
pub fn as_elements<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], LoadError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| LoadError::wrong_type(key, "array", value))
}

/// Reads a field, treating an explicit `null` the same as absence.
pub fn opt_field<'a>(doc: &'a Document, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|value| !value.is_null())
}

fn require<'a>(doc: &'a Document, key: &str) -> Result<&'a Value, LoadError> {
    opt_field(doc, key).ok_or_else(|| LoadError::missing(key))
}

/// Reads a required `i64` field.
pub fn get_i64(doc: &Document, key: &str) -> Result<i64, LoadError> {
    let value = require(doc, key)?;
    value
        .as_i64()
        .ok_or_else(|| LoadError::wrong_type(key, "i64", value))
}

/// Reads an optional `i64` field.
pub fn opt_i64(doc: &Document, key: &str) -> Result<Option<i64>, LoadError> {
    opt_field(doc, key)
        .map(|value| {
            value
                .as_i64()
                .ok_or_else(|| LoadError::wrong_type(key, "i64", value))
        })
        .transpose()
}

/// Reads a required `i32` field.
pub fn get_i32(doc: &Document, key: &str) -> Result<i32, LoadError> {
    let value = require(doc, key)?;
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| LoadError::wrong_type(key, "i32", value))
}

/// Reads an optional `i32` field.
pub fn opt_i32(doc: &Document, key: &str) -> Result<Option<i32>, LoadError> {
    opt_field(doc, key)
        .map(|value| {
            value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| LoadError::wrong_type(key, "i32", value))
        })
        .transpose()
}

/// Reads a required string field.
pub fn get_str<'a>(doc: &'a Document, key: &str) -> Result<&'a str, LoadError> {
    let value = require(doc, key)?;
    value
        .as_str()
        .ok_or_else(|| LoadError::wrong_type(key, "string", value))
}

/// Reads an optional string field.
pub fn opt_str<'a>(doc: &'a Document, key: &str) -> Result<Option<&'a str>, LoadError> {
    opt_field(doc, key)
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| LoadError::wrong_type(key, "string", value))
        })
        .transpose()
}

/// Reads a required boolean field.
pub fn get_bool(doc: &Document, key: &str) -> Result<bool, LoadError> {
    let value = require(doc, key)?;
    value
        .as_bool()
        .ok_or_else(|| LoadError::wrong_type(key, "boolean", value))
}

/// Reads an optional boolean field.
pub fn opt_bool(doc: &Document, key: &str) -> Result<Option<bool>, LoadError> {
    opt_field(doc, key)
        .map(|value| {
            value
                .as_bool()
                .ok_or_else(|| LoadError::wrong_type(key, "boolean", value))
        })
        .transpose()
}

/// Reads a required embedded document field.
pub fn get_document<'a>(doc: &'a Document, key: &str) -> Result<&'a Document, LoadError> {
    let value = require(doc, key)?;
    as_document(value, key)
}

/// Reads an optional embedded document field.
pub fn opt_document<'a>(doc: &'a Document, key: &str) -> Result<Option<&'a Document>, LoadError> {
    opt_field(doc, key).map(|value| as_document(value, key)).transpose()
}

/// Reads an optional array field.
pub fn opt_elements<'a>(doc: &'a Document, key: &str) -> Result<Option<&'a [Value]>, LoadError> {
    opt_field(doc, key).map(|value| as_elements(value, key)).transpose()
}

/// Reads a required datetime field (epoch milliseconds).
pub fn get_timestamp(doc: &Document, key: &str) -> Result<Timestamp, LoadError> {
    let value = require(doc, key)?;
    value
        .as_i64()
        .and_then(Timestamp::from_millis)
        .ok_or_else(|| LoadError::wrong_type(key, "timestamp", value))
}

/// Reads an optional datetime field (epoch milliseconds).
pub fn opt_timestamp(doc: &Document, key: &str) -> Result<Option<Timestamp>, LoadError> {
    opt_field(doc, key)
        .map(|value| {
            value
                .as_i64()
                .and_then(Timestamp::from_millis)
                .ok_or_else(|| LoadError::wrong_type(key, "timestamp", value))
        })
        .transpose()
}

/// Reads an optional calendar-date field (`yyyymmdd` integer).
#[cfg(feature = "chrono")]
pub fn opt_date(doc: &Document, key: &str) -> Result<Option<NaiveDate>, LoadError> {
    opt_field(doc, key)
        .map(|value| {
            value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .and_then(date_from_number)
                .ok_or_else(|| LoadError::wrong_type(key, "yyyymmdd date", value))
        })
        .transpose()
}
