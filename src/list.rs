// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Whole-value list fields.
//!
//! A [`SimpleList`] is a *nil-able* array field of primitives that is always
//! written wholesale: any change re-sends the entire array, and clearing it
//! unsets the field at the store. Per-element delta tracking is deliberately
//! out of scope — lists in this model are small value collections (card
//! hands, order-id histories), not keyed entities; those belong in a map
//! model.

use crate::{
    document::{self, LoadError},
    model::Model,
    path::DotPath,
    scalar::Scalar,
    update::Update,
};
use serde_json::Value;

/// A nil-able list field holding primitive values.
///
/// "Nil" (no list at all) and "empty" (a present, zero-length list) are
/// distinct states, mirroring an absent versus present-but-empty array field
/// in the stored document.
#[derive(Debug, Clone)]
pub struct SimpleList<V: Scalar> {
    path: DotPath,
    list: Option<Vec<V>>,
    updated: bool,
}

impl<V: Scalar> SimpleList<V> {
    /// Creates a nil list addressed by `path`.
    pub fn new(path: DotPath) -> Self {
        Self {
            path,
            list: None,
            updated: false,
        }
    }

    /// The document path of this list.
    pub fn path(&self) -> &DotPath {
        &self.path
    }

    /// The current values, or `None` when the list is nil.
    pub fn values(&self) -> Option<&[V]> {
        self.list.as_deref()
    }

    /// Returns whether the list is nil.
    pub fn is_nil(&self) -> bool {
        self.list.is_none()
    }

    /// The number of values; zero when nil.
    pub fn len(&self) -> usize {
        self.list.as_ref().map_or(0, Vec::len)
    }

    /// Returns whether the list holds no values (nil counts as empty).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the whole list.
    ///
    /// Setting the values the list already holds is a no-op.
    pub fn set_values(&mut self, values: Vec<V>) {
        if self.list.as_deref() != Some(values.as_slice()) {
            self.list = Some(values);
            self.updated = true;
        }
    }

    /// Makes the list nil; the field will be unset at the store.
    ///
    /// Clearing an already-nil list is a no-op.
    pub fn clear(&mut self) {
        if self.list.is_some() {
            self.list = None;
            self.updated = true;
        }
    }
}

impl<V: Scalar> Model for SimpleList<V> {
    fn to_document(&self) -> Value {
        match &self.list {
            Some(values) => Value::Array(values.iter().map(Scalar::to_value).collect()),
            None => Value::Null,
        }
    }

    fn load(&mut self, src: &Value) -> Result<(), LoadError> {
        if src.is_null() {
            self.list = None;
            return Ok(());
        }
        let elements = document::as_elements(src, self.path.value())?;
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let value = V::from_value(element).ok_or_else(|| {
                LoadError::wrong_type(self.path.value(), "list element", element)
            })?;
            values.push(value);
        }
        self.list = Some(values);
        Ok(())
    }

    fn append_updates(&self, updates: &mut Vec<Update>) -> usize {
        if !self.updated {
            return 0;
        }
        if self.is_nil() {
            updates.push(Update::unset(&self.path));
        } else {
            updates.push(Update::set(&self.path, self.to_document()));
        }
        1
    }

    fn updated(&self) -> bool {
        self.updated
    }

    fn to_update(&self) -> Value {
        self.to_document()
    }

    fn deleted_size(&self) -> usize {
        usize::from(self.updated && self.is_nil())
    }

    fn reset_children(&mut self) {}

    fn reset_states(&mut self) {
        self.updated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cards() -> SimpleList<i32> {
        SimpleList::new(DotPath::of("cs").resolve("cs"))
    }

    #[test]
    fn starts_nil_and_clean() {
        let list = cards();
        assert!(list.is_nil());
        assert!(list.is_empty());
        assert!(!list.updated());
        assert_eq!(list.to_document(), Value::Null);
    }

    #[test]
    fn set_values_updates_wholesale() {
        let mut list = cards();
        list.set_values(vec![1, 2, 3, 4]);
        assert!(list.updated());
        let mut updates = Vec::new();
        assert_eq!(list.append_updates(&mut updates), 1);
        assert_eq!(
            updates,
            [Update::set(
                &DotPath::of("cs").resolve("cs"),
                json!([1, 2, 3, 4]),
            )]
        );
        assert_eq!(list.deleted_size(), 0);
    }

    #[test]
    fn setting_equal_values_is_a_no_op() {
        let mut list = cards();
        list.set_values(vec![1, 2]);
        list.reset();
        list.set_values(vec![1, 2]);
        assert!(!list.updated());
    }

    #[test]
    fn clear_unsets_the_field() {
        let mut list = cards();
        list.set_values(vec![0, 1, 2, 3, 4]);
        list.reset();
        list.clear();
        assert!(list.is_nil());
        assert_eq!(list.deleted_size(), 1);
        let mut updates = Vec::new();
        list.append_updates(&mut updates);
        assert_eq!(updates, [Update::unset(&DotPath::of("cs").resolve("cs"))]);
    }

    #[test]
    fn clearing_a_nil_list_is_a_no_op() {
        let mut list = cards();
        list.clear();
        assert!(!list.updated());
        assert_eq!(list.deleted_size(), 0);
    }

    #[test]
    fn load_replaces_values_without_marking() {
        let mut list = cards();
        list.load(&json!([1, 2, 3])).unwrap();
        assert_eq!(list.values(), Some([1, 2, 3].as_slice()));
        assert!(!list.updated());
        list.load(&Value::Null).unwrap();
        assert!(list.is_nil());
    }

    #[test]
    fn load_fails_loudly_on_bad_elements() {
        let mut list = cards();
        assert!(matches!(
            list.load(&json!([1, "two"])),
            Err(LoadError::WrongType { .. })
        ));
        assert!(matches!(
            list.load(&json!({"not": "a list"})),
            Err(LoadError::WrongType { .. })
        ));
    }
}
