// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Simple values storable inside map and list models.
//!
//! [`Scalar`] is the codec between a primitive Rust value and its storage
//! representation inside a document. The collection models are generic over
//! it, so a `SimpleMap<i32, i64>` and a `SimpleMap<String, Timestamp>` share
//! all of their bookkeeping.

use crate::timestamp::Timestamp;
#[cfg(feature = "chrono")]
use crate::timestamp::{date_from_number, date_to_number};
#[cfg(feature = "chrono")]
use chrono::NaiveDate;
use serde_json::Value;

/// A primitive value directly encodable into a document.
///
/// `from_value` is total over arbitrary documents: it returns `None` for a
/// value of the wrong shape and leaves the error policy (skip, default,
/// fail) to the caller.
pub trait Scalar: Clone + PartialEq {
    /// The storage representation of this value.
    fn to_value(&self) -> Value;

    /// Decodes a value from its storage representation.
    fn from_value(value: &Value) -> Option<Self>;
}

impl Scalar for i32 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|n| i32::try_from(n).ok())
    }
}

impl Scalar for i64 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl Scalar for bool {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Scalar for String {
    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl Scalar for Timestamp {
    // epoch milliseconds
    fn to_value(&self) -> Value {
        Value::from(self.as_millis())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(Timestamp::from_millis)
    }
}

#[cfg(feature = "chrono")]
impl Scalar for NaiveDate {
    // yyyymmdd integer, e.g. 2021-07-12 as 20210712
    fn to_value(&self) -> Value {
        Value::from(date_to_number(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .and_then(date_from_number)
    }
}
