// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::{EntryState, MapKey};
use crate::{
    document::{self, Document, LoadError},
    model::Model,
    path::DotPath,
    scalar::Scalar,
    update::Update,
};
use ahash::RandomState;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

/// A map model whose values are primitives.
///
/// The present entries live in an insertion-ordered table; on top of it the
/// map records the pending add/modify/remove delta for the current dirty
/// window (see the [module docs](crate::maps) for the delta invariants).
///
/// ```rust
/// use deltadoc::{DotPath, Model, SimpleMap, Update};
///
/// let mut items: SimpleMap<i32, i32> = SimpleMap::new(DotPath::of("itm"));
/// items.put(2001, 5);
/// items.reset(); // pretend the map was flushed
///
/// items.put(2002, 1);
/// items.remove(&2001);
/// let mut updates = Vec::new();
/// items.append_updates(&mut updates);
/// assert_eq!(
///     updates,
///     [
///         Update::set(&DotPath::of("itm").resolve(2002), 1),
///         Update::unset(&DotPath::of("itm").resolve(2001)),
///     ],
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SimpleMap<K: MapKey, V: Scalar> {
    path: DotPath,
    map: IndexMap<K, V, RandomState>,
    delta: IndexMap<K, EntryState<V>, RandomState>,
}

impl<K: MapKey, V: Scalar> SimpleMap<K, V> {
    /// Creates an empty map addressed by `path`.
    pub fn new(path: DotPath) -> Self {
        Self {
            path,
            map: IndexMap::default(),
            delta: IndexMap::default(),
        }
    }

    /// The document path of this map.
    pub fn path(&self) -> &DotPath {
        &self.path
    }

    /// Returns the value at `key`, if any.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// The number of present entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the map has no present entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over the present entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }

    /// Iterates over the present keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Associates `value` with `key` and returns the previous value, if any.
    ///
    /// The key joins the added-or-modified set: *added* if the store has
    /// never seen it, *modified* otherwise. A pending removal of the same
    /// key is superseded — the re-add becomes a plain update.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let old = self.map.insert(key.clone(), value);
        if matches!(self.delta.get(&key), Some(EntryState::Removed(_))) {
            // removed then re-added in one window: an update, re-queued at
            // the tail as the latest mutation
            self.delta.shift_remove(&key);
            self.delta.insert(key, EntryState::Updated);
        } else if !self.delta.contains_key(&key) {
            let state = if old.is_some() {
                EntryState::Updated
            } else {
                EntryState::Added
            };
            self.delta.insert(key, state);
        }
        old
    }

    /// Removes `key` and returns its value, if it was present.
    ///
    /// A key added in the current window cancels out entirely: the store
    /// never saw it, so neither an update nor a delete is pending afterwards.
    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.map.shift_remove(key)?;
        match self.delta.shift_remove(key) {
            Some(EntryState::Added) => {}
            Some(EntryState::Updated) | Some(EntryState::Removed(_)) | None => {
                self.delta.insert(key.clone(), EntryState::Removed(value.clone()));
            }
        }
        Some(value)
    }

    /// Removes every present entry, applying the [`remove`](Self::remove)
    /// rule to each.
    pub fn clear(&mut self) {
        let keys: Vec<K> = self.map.keys().cloned().collect();
        for key in keys {
            self.remove(&key);
        }
    }
}

impl<K: MapKey, V: Scalar> Model for SimpleMap<K, V> {
    fn to_document(&self) -> Value {
        let doc: Document = self
            .map
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_value()))
            .collect();
        Value::Object(doc)
    }

    fn load(&mut self, src: &Value) -> Result<(), LoadError> {
        let src = document::as_document(src, self.path.value())?;
        self.map = IndexMap::default();
        self.delta.clear();
        for (raw, value) in src {
            let (Some(key), Some(value)) = (K::parse(raw), V::from_value(value)) else {
                // unsupported entries are skipped, not failed
                warn!(
                    path = self.path.value(),
                    key = raw.as_str(),
                    "skipping map entry of unsupported shape"
                );
                continue;
            };
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn append_updates(&self, updates: &mut Vec<Update>) -> usize {
        for (key, state) in &self.delta {
            match state {
                EntryState::Added | EntryState::Updated => {
                    updates.push(Update::set(&self.path.resolve(key), self.map[key].to_value()));
                }
                EntryState::Removed(_) => {
                    updates.push(Update::unset(&self.path.resolve(key)));
                }
            }
        }
        self.delta.len()
    }

    fn updated(&self) -> bool {
        !self.delta.is_empty()
    }

    fn to_update(&self) -> Value {
        let mut update = Document::new();
        for (key, state) in &self.delta {
            if !state.is_removal() {
                update.insert(key.to_string(), self.map[key].to_value());
            }
        }
        Value::Object(update)
    }

    fn to_delete(&self) -> Value {
        let mut delete = Document::new();
        for (key, state) in &self.delta {
            if let EntryState::Removed(last) = state {
                delete.insert(key.to_string(), last.to_value());
            }
        }
        Value::Object(delete)
    }

    fn deleted_size(&self) -> usize {
        self.delta.values().filter(|state| state.is_removal()).count()
    }

    fn reset_children(&mut self) {}

    fn reset_states(&mut self) {
        self.delta.clear();
    }
}
