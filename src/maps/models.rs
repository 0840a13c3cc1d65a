// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::{EntryState, MapKey};
use crate::{
    document::{self, Document, LoadError},
    model::{EntryModel, Model},
    path::DotPath,
    update::Update,
};
use ahash::RandomState;
use indexmap::IndexMap;
use serde_json::Value;

/// A map model whose values are composite sub-documents.
///
/// Entries implement [`EntryModel`] and keep their own dirty tracking, but
/// the map-level add/modify/remove bookkeeping supersedes it for flush
/// purposes: an added-or-modified entry is re-serialized in full, which keeps
/// the update/delete semantics of the map simple and rules out partial-entry
/// update bugs.
///
/// Because entries hold no reference back to the map, in-place mutation goes
/// through [`get_mut`](Self::get_mut), which marks the entry's key as
/// modified.
#[derive(Debug, Clone)]
pub struct ModelMap<K: MapKey, M: EntryModel> {
    path: DotPath,
    map: IndexMap<K, M, RandomState>,
    // removals carry the entry's last document as the delete-payload marker
    delta: IndexMap<K, EntryState<Value>, RandomState>,
}

impl<K: MapKey, M: EntryModel> ModelMap<K, M> {
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

    /// Returns the entry at `key`, if any.
    pub fn get(&self, key: &K) -> Option<&M> {
        self.map.get(key)
    }

    /// Returns a mutable reference to the entry at `key`, marking the key
    /// modified.
    ///
    /// The mark is pessimistic: whether the caller actually changes anything
    /// cannot be observed from here, and an unflushed full re-serialization
    /// of an unchanged entry is harmless. Use [`get`](Self::get) for reads.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut M> {
        if self.map.contains_key(key) && !self.delta.contains_key(key) {
            self.delta.insert(key.clone(), EntryState::Updated);
        }
        self.map.get_mut(key)
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
    pub fn iter(&self) -> impl Iterator<Item = (&K, &M)> {
        self.map.iter()
    }

    /// Iterates over the present keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Associates `value` with `key` and returns the previous entry, if any.
    ///
    /// Same delta rules as [`SimpleMap::put`](crate::SimpleMap::put): a key
    /// the store has never seen is an add, anything else a modification, and
    /// a pending removal of the key is superseded.
    pub fn put(&mut self, key: K, value: M) -> Option<M> {
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

    /// Removes `key` and returns its entry, if it was present.
    ///
    /// Same delta rules as [`SimpleMap::remove`](crate::SimpleMap::remove):
    /// a key added in the current window cancels out entirely, and removing
    /// an absent key is a no-op.
    pub fn remove(&mut self, key: &K) -> Option<M> {
        let value = self.map.shift_remove(key)?;
        match self.delta.shift_remove(key) {
            Some(EntryState::Added) => {}
            Some(EntryState::Updated) | Some(EntryState::Removed(_)) | None => {
                self.delta
                    .insert(key.clone(), EntryState::Removed(value.to_document()));
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

impl<K: MapKey, M: EntryModel> Model for ModelMap<K, M> {
    fn to_document(&self) -> Value {
        let doc: Document = self
            .map
            .iter()
            .map(|(key, entry)| (key.to_string(), entry.to_document()))
            .collect();
        Value::Object(doc)
    }

    fn load(&mut self, src: &Value) -> Result<(), LoadError> {
        let src = document::as_document(src, self.path.value())?;
        self.map = IndexMap::default();
        self.delta.clear();
        for (raw, value) in src {
            if !value.is_object() {
                // skip non-document values
                continue;
            }
            let key = K::parse(raw).ok_or_else(|| LoadError::invalid_key(raw.clone()))?;
            let mut entry = M::default();
            entry.load(value)?;
            self.map.insert(key, entry);
        }
        Ok(())
    }

    fn append_updates(&self, updates: &mut Vec<Update>) -> usize {
        for (key, state) in &self.delta {
            match state {
                EntryState::Added | EntryState::Updated => {
                    updates.push(Update::set(
                        &self.path.resolve(key),
                        self.map[key].to_document(),
                    ));
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
                update.insert(key.to_string(), self.map[key].to_update());
            }
        }
        Value::Object(update)
    }

    fn to_delete(&self) -> Value {
        let mut delete = Document::new();
        for (key, state) in &self.delta {
            if let EntryState::Removed(last) = state {
                delete.insert(key.to_string(), last.clone());
            }
        }
        Value::Object(delete)
    }

    fn deleted_size(&self) -> usize {
        self.delta.values().filter(|state| state.is_removal()).count()
    }

    fn reset_children(&mut self) {
        let pending: Vec<K> = self
            .delta
            .iter()
            .filter(|(_, state)| !state.is_removal())
            .map(|(key, _)| key.clone())
            .collect();
        for key in pending {
            if let Some(entry) = self.map.get_mut(&key) {
                entry.reset();
            }
        }
    }

    fn reset_states(&mut self) {
        self.delta.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirty::DirtyFlags;
    use serde_json::json;

    /// Minimal composite entry: a piece of gear with two stats.
    #[derive(Debug, Clone)]
    struct Gear {
        dirty: DirtyFlags,
        atk: i32,
        def: i32,
    }

    impl Default for Gear {
        fn default() -> Self {
            Gear::new()
        }
    }

    const ATK: u32 = 0;
    const DEF: u32 = 1;

    impl Gear {
        fn of(atk: i32, def: i32) -> Self {
            let mut gear = Gear::new();
            gear.set_atk(atk);
            gear.set_def(def);
            gear
        }

        fn new() -> Self {
            Gear {
                dirty: DirtyFlags::new(2),
                atk: 0,
                def: 0,
            }
        }

        fn set_atk(&mut self, atk: i32) {
            if self.atk != atk {
                self.atk = atk;
                self.dirty.set(ATK);
            }
        }

        fn set_def(&mut self, def: i32) {
            if self.def != def {
                self.def = def;
                self.dirty.set(DEF);
            }
        }
    }

    impl EntryModel for Gear {
        fn to_document(&self) -> Value {
            json!({"atk": self.atk, "def": self.def})
        }

        fn load(&mut self, src: &Value) -> Result<(), LoadError> {
            let src = document::as_document(src, "gear")?;
            self.atk = document::get_i32(src, "atk")?;
            self.def = document::get_i32(src, "def")?;
            Ok(())
        }

        fn to_update(&self) -> Value {
            let mut update = Document::new();
            if self.dirty.get(ATK) {
                update.insert("atk".into(), json!(self.atk));
            }
            if self.dirty.get(DEF) {
                update.insert("def".into(), json!(self.def));
            }
            Value::Object(update)
        }

        fn updated(&self) -> bool {
            self.dirty.any()
        }

        fn reset(&mut self) {
            self.dirty.clear();
        }
    }

    fn flushed(entries: Vec<(&str, Gear)>) -> ModelMap<String, Gear> {
        let mut map = ModelMap::new(DotPath::of("eqm"));
        for (key, gear) in entries {
            map.put(key.to_owned(), gear);
        }
        map.reset();
        map
    }

    fn updates_of(map: &ModelMap<String, Gear>) -> Vec<Update> {
        let mut updates = Vec::new();
        map.append_updates(&mut updates);
        updates
    }

    #[test]
    fn put_emits_the_full_entry_document() {
        let mut map = flushed(vec![]);
        map.put("a".to_owned(), Gear::of(10, 0));
        assert_eq!(
            updates_of(&map),
            [Update::set(
                &DotPath::of("eqm").resolve("a"),
                json!({"atk": 10, "def": 0}),
            )]
        );
    }

    #[test]
    fn get_mut_marks_the_entry_modified() {
        let mut map = flushed(vec![("a", Gear::of(10, 0))]);
        map.get_mut(&"a".to_owned()).unwrap().set_atk(12);
        assert!(map.updated());
        assert_eq!(
            updates_of(&map),
            [Update::set(
                &DotPath::of("eqm").resolve("a"),
                json!({"atk": 12, "def": 0}),
            )]
        );
        // the entry's own dirty tracking drives the external payload
        assert_eq!(map.to_update(), json!({"a": {"atk": 12}}));
    }

    #[test]
    fn get_keeps_the_map_clean() {
        let map = flushed(vec![("a", Gear::of(10, 0))]);
        assert_eq!(map.get(&"a".to_owned()).unwrap().atk, 10);
        assert!(!map.updated());
    }

    #[test]
    fn remove_of_flushed_entry_deletes_with_document_marker() {
        let mut map = flushed(vec![("a", Gear::of(10, 0))]);
        assert!(map.remove(&"a".to_owned()).is_some());
        assert_eq!(
            updates_of(&map),
            [Update::unset(&DotPath::of("eqm").resolve("a"))]
        );
        assert_eq!(map.to_delete(), json!({"a": {"atk": 10, "def": 0}}));
        assert_eq!(map.deleted_size(), 1);
    }

    #[test]
    fn remove_of_fresh_entry_cancels_out() {
        let mut map = flushed(vec![]);
        map.put("a".to_owned(), Gear::of(10, 0));
        map.remove(&"a".to_owned());
        assert!(!map.updated());
        assert_eq!(updates_of(&map), Vec::<Update>::new());
        assert_eq!(map.to_delete(), json!({}));
    }

    #[test]
    fn mixed_mutations_emit_in_call_order() {
        let mut map = flushed(vec![("a", Gear::of(10, 0)), ("b", Gear::of(2, 5))]);
        map.get_mut(&"a".to_owned()).unwrap().set_atk(12);
        map.remove(&"b".to_owned());
        map.put("c".to_owned(), Gear::of(0, 9));
        assert_eq!(
            updates_of(&map),
            [
                Update::set(&DotPath::of("eqm").resolve("a"), json!({"atk": 12, "def": 0})),
                Update::unset(&DotPath::of("eqm").resolve("b")),
                Update::set(&DotPath::of("eqm").resolve("c"), json!({"atk": 0, "def": 9})),
            ]
        );
    }

    #[test]
    fn reset_clears_map_delta_and_entry_dirty_state() {
        let mut map = flushed(vec![]);
        map.put("a".to_owned(), Gear::of(10, 0));
        map.reset();
        assert!(!map.updated());
        assert!(!map.get(&"a".to_owned()).unwrap().updated());
    }

    #[test]
    fn load_builds_clean_entries() {
        let mut map: ModelMap<String, Gear> = ModelMap::new(DotPath::of("eqm"));
        map.load(&json!({"a": {"atk": 12, "def": 2}, "skipped": 7}))
            .unwrap();
        assert_eq!(map.len(), 1);
        assert!(!map.updated());
        assert!(!map.get(&"a".to_owned()).unwrap().updated());
    }

    #[test]
    fn load_propagates_entry_errors() {
        let mut map: ModelMap<String, Gear> = ModelMap::new(DotPath::of("eqm"));
        let err = map.load(&json!({"a": {"atk": 12}})).unwrap_err();
        assert_eq!(err, LoadError::Missing { key: "def".into() });
    }

    #[test]
    fn load_rejects_unparseable_keys() {
        let mut map: ModelMap<i32, Gear> = ModelMap::new(DotPath::of("eqm"));
        let err = map
            .load(&json!({"nope": {"atk": 1, "def": 2}}))
            .unwrap_err();
        assert_eq!(err, LoadError::InvalidKey { key: "nope".into() });
    }
}
