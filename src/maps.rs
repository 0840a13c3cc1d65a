// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Keyed collection models.
//!
//! Maps are the one place where change tracking needs more than dirty bits:
//! a removed key must become an explicit *unset* operation at the store, so
//! the models here track, per key, whether the pending change is an add, a
//! modification, or a removal. The bookkeeping lives in an insertion-ordered
//! delta queue, which makes the emitted operation stream follow the order of
//! the mutating calls.
//!
//! Two flavors share the bookkeeping and differ only in value shape:
//!
//! - [`SimpleMap`]: values are primitives ([`Scalar`](crate::Scalar)), e.g.
//!   an item-count map `{2001: 5}`.
//! - [`ModelMap`]: values are composite sub-documents
//!   ([`EntryModel`](crate::EntryModel)) with their own dirty tracking. For
//!   flush purposes the map-level bookkeeping supersedes the per-entry
//!   tracking: an added-or-modified entry is re-serialized in full.
//!
//! ## Delta-queue invariants
//!
//! - a key is *added* when the store has never seen it; removing it in the
//!   same dirty window cancels both events entirely;
//! - a key the store has seen becomes *modified* on put and *removed* on
//!   remove; removing and re-adding it in one window collapses into a
//!   modification (an update, not delete-then-insert);
//! - the added-or-modified and removed sets never overlap.

use std::fmt;
use std::hash::Hash;

mod models;
mod simple;

pub use models::ModelMap;
pub use simple::SimpleMap;

/// A key usable in a map model.
///
/// Document stores key embedded maps by strings, so a key must render to a
/// string (its `Display` form) and parse back from one.
pub trait MapKey: Clone + Eq + Hash + fmt::Display {
    /// Parses a key from its document representation.
    fn parse(raw: &str) -> Option<Self>;
}

impl MapKey for i32 {
    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl MapKey for i64 {
    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl MapKey for u32 {
    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl MapKey for String {
    fn parse(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }
}

/// The pending change recorded for one key in a dirty window.
///
/// `Removed` carries the last known value, which doubles as the marker in
/// the delete payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EntryState<T> {
    /// The store has never seen this key.
    Added,
    /// The store knows this key; its value changed.
    Updated,
    /// The store knows this key; it is gone now.
    Removed(T),
}

impl<T> EntryState<T> {
    pub(crate) fn is_removal(&self) -> bool {
        matches!(self, EntryState::Removed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_display() {
        assert_eq!(i32::parse(&2001.to_string()), Some(2001));
        assert_eq!(i64::parse("-7"), Some(-7));
        assert_eq!(u32::parse("-7"), None);
        assert_eq!(String::parse("a.b"), Some("a.b".to_owned()));
    }

    #[test]
    fn non_numeric_keys_do_not_parse() {
        assert_eq!(i32::parse("2001x"), None);
        assert_eq!(i32::parse(""), None);
    }
}
