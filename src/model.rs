// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The model capability set.
//!
//! Every node of an aggregate tree — composite objects, map models, list
//! models, and the root — implements [`Model`]. The trait captures the whole
//! lifecycle of a change-tracked node:
//!
//! 1. **Load**: [`Model::load`] populates every field from a source document.
//!    Loading never resets dirty state by itself; only the root-level
//!    [`RootModel::load_root`] does, once, after the whole tree is populated,
//!    so that "freshly loaded" and "clean" become true atomically.
//! 2. **Mutate**: application code calls the node's typed setters. A setter
//!    compares against the current value and is a complete no-op when equal;
//!    otherwise it stores the value and marks the field's dirty slot.
//! 3. **Flush**: [`Model::append_updates`] walks the tree in field
//!    declaration order and emits one [`Update`] per dirty field and per
//!    pending map/list delta. [`Model::to_update`] and [`Model::to_delete`]
//!    produce the equivalent consumer-facing payloads, keyed by descriptive
//!    *external* names instead of the short storage keys.
//! 4. **Reset**: after the flush has been durably acknowledged, the caller
//!    invokes [`Model::reset`] on the root, which recursively clears every
//!    dirty tracker and delta queue without touching the data itself. If the
//!    flush fails the caller simply does not reset, and the same update set
//!    can be recomputed for a retry.
//!
//! The `updated` query is answered by walking down the owned tree rather
//! than by bubbling a flag up through parent pointers: children are uniquely
//! owned, so the recursion is cheap and there is no back-reference to keep
//! consistent.

use crate::document::LoadError;
use crate::update::Update;
use serde_json::Value;

/// A change-tracked node of an aggregate tree.
pub trait Model {
    /// Serializes this node in full, every field regardless of dirty state,
    /// using storage keys. Used for inserts and full snapshots.
    fn to_document(&self) -> Value;

    /// Populates every field from `src`.
    ///
    /// Composite and map children are delegated to; absent optional children
    /// are cleared. Dirty state is left exactly as the population produced
    /// it — resetting is the root's job (see [`RootModel::load_root`]).
    ///
    /// # Errors
    ///
    /// Fails loudly if a required field is absent or of the wrong type, so a
    /// partially-loaded node is never used silently.
    fn load(&mut self, src: &Value) -> Result<(), LoadError>;

    /// Appends one update operation per dirty field and per pending map
    /// delta, in field declaration order, and returns the number appended.
    fn append_updates(&self, updates: &mut Vec<Update>) -> usize;

    /// Returns whether this node or any descendant has a dirty field or a
    /// pending map/list delta.
    fn updated(&self) -> bool;

    /// Builds the partial-update payload: only dirty fields and only updated
    /// children, keyed by external (descriptive) names.
    fn to_update(&self) -> Value;

    /// Builds the partial-delete payload: only children with pending
    /// deletions, keyed by external names. Scalar fields never produce
    /// deletions.
    fn to_delete(&self) -> Value {
        Value::Object(Default::default())
    }

    /// The number of pending deletions beneath this node.
    fn deleted_size(&self) -> usize {
        0
    }

    /// Resets the dirty state of every child. Part of the [`Model::reset`]
    /// template; not normally called directly.
    fn reset_children(&mut self);

    /// Resets this node's own dirty state (field slots, delta queues). Part
    /// of the [`Model::reset`] template; not normally called directly.
    fn reset_states(&mut self);

    /// Clears all dirty state beneath this node without discarding data.
    ///
    /// Idempotent: resetting an already-clean node is a no-op.
    fn reset(&mut self) {
        self.reset_children();
        self.reset_states();
    }
}

/// The aggregation root of a model tree.
///
/// The root is the externally identified entry point (e.g. one player keyed
/// by uid); it owns the whole tree and is the only node on which the
/// load-then-reset and flush-then-reset protocols are driven.
pub trait RootModel: Model {
    /// Loads the whole tree from `src` and resets it.
    ///
    /// Freshly loaded data matches the store by definition, so the tree is
    /// clean afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the first [`LoadError`]; on error the tree may be partially
    /// populated and must not be used.
    fn load_root(&mut self, src: &Value) -> Result<(), LoadError> {
        self.load(src)?;
        self.reset();
        Ok(())
    }

    /// Collects the full ordered update-operation list for the current dirty
    /// window.
    fn to_updates(&self) -> Vec<Update> {
        let mut updates = Vec::new();
        self.append_updates(&mut updates);
        updates
    }
}

/// A composite value stored inside a [`ModelMap`](crate::ModelMap).
///
/// Map entries are subordinate to their map's add/modify/remove bookkeeping:
/// on flush an added-or-modified entry is re-serialized in full rather than
/// field by field, so entries carry no document path and no per-field update
/// emission of their own. Their dirty tracker still drives the granularity
/// of [`EntryModel::to_update`] payloads.
pub trait EntryModel: Default {
    /// Serializes this entry in full, using storage keys.
    fn to_document(&self) -> Value;

    /// Populates every field from `src`.
    ///
    /// # Errors
    ///
    /// Fails loudly if a required field is absent or of the wrong type.
    fn load(&mut self, src: &Value) -> Result<(), LoadError>;

    /// Builds the dirty-fields-only payload, keyed by external names.
    fn to_update(&self) -> Value;

    /// Returns whether any field of this entry is dirty.
    fn updated(&self) -> bool;

    /// Clears this entry's dirty state.
    fn reset(&mut self);
}
