// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Update operations in dotted-path notation.
//!
//! The flush side of the model produces an ordered list of [`Update`]s: `Set`
//! writes a value at a path, `Unset` removes the field at a path. The list is
//! built by walking the aggregate tree in field-declaration order, so a
//! driver can translate it 1:1 into store-specific partial-update commands
//! (for MongoDB-style stores, `$set`/`$unset`).

use crate::path::DotPath;
use serde_json::Value;
use std::fmt;

/// A single partial-update operation against a document store.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum Update {
    /// Set the field at `path` to `value`.
    Set {
        /// Dotted target path, e.g. `wt.ct`.
        path: String,
        /// The new value, in storage representation.
        value: Value,
    },
    /// Remove the field at `path`.
    Unset {
        /// Dotted target path, e.g. `itm.2001`.
        path: String,
    },
}

impl Update {
    /// Creates a `Set` operation targeting `path`.
    pub fn set(path: &DotPath, value: impl Into<Value>) -> Self {
        Update::Set {
            path: path.value().to_owned(),
            value: value.into(),
        }
    }

    /// Creates an `Unset` operation targeting `path`.
    pub fn unset(path: &DotPath) -> Self {
        Update::Unset {
            path: path.value().to_owned(),
        }
    }

    /// The dotted path this operation targets.
    pub fn path(&self) -> &str {
        match self {
            Update::Set { path, .. } | Update::Unset { path } => path,
        }
    }

    /// The value written by a `Set`, or `None` for an `Unset`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Update::Set { value, .. } => Some(value),
            Update::Unset { .. } => None,
        }
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Set { path, value } => write!(f, "set {path} = {value}"),
            Update::Unset { path } => write!(f, "unset {path}"),
        }
    }
}
