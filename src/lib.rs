// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # deltadoc: An Incremental Change-Tracking Document Model
//!
//! This crate maps structured, nested application objects to a document-store
//! representation (BSON/JSON-like) while tracking, at field granularity,
//! which parts of the object graph have changed since the last persistence
//! checkpoint — so that only a minimal set of update and delete operations
//! needs to be sent to the backing store.
//!
//! Unlike mappers that diff two snapshots at flush time, deltadoc records
//! changes *as they happen*: every typed setter compares against the current
//! value and marks a per-field dirty bit only on a real change. Redundant
//! writes are free and never pollute the update set.
//!
//! ## Core Concepts
//!
//! An **aggregate** is a tree of nodes owned by a single root (for example,
//! one player document keyed by uid). The node kinds are:
//!
//! - **Composite objects**: your own structs holding typed scalar fields and
//!   child nodes, implementing [`Model`] with a [`DirtyFlags`] tracker and
//!   guard-style setters.
//! - [`SimpleMap`]: a keyed map of primitive values (`{2001: 5}`), tracking
//!   per-key add/modify/remove deltas.
//! - [`ModelMap`]: a keyed map of composite sub-documents ([`EntryModel`]),
//!   with the same per-key bookkeeping; added-or-modified entries are
//!   re-serialized in full on flush.
//! - [`SimpleList`]: a nil-able array field written wholesale.
//! - The **root**: a composite that additionally implements [`RootModel`],
//!   the entry point for the load and flush protocols.
//!
//! Removals get their own bookkeeping because a removed map key must become
//! an explicit *unset* operation at the store — it cannot be expressed as a
//! value update. A key that is added and removed within the same dirty
//! window cancels out entirely (the store never saw it), and a key that is
//! removed and re-added collapses into a plain update.
//!
//! ## The Flush Protocol
//!
//! 1. Application code mutates fields through setters and map operations.
//! 2. When ready to persist, ask the root for the accumulated changes:
//!    - [`RootModel::to_updates`] — the ordered `(path, value)` operation
//!      list, in storage-key dot notation ([`Update`]), for the store driver;
//!    - [`Model::to_update`] / [`Model::to_delete`] — nested payloads keyed
//!      by descriptive *external* names, for consumers and auditing;
//!    - [`Model::to_document`] — the full document, for inserts.
//! 3. Send the operations with your driver. **Only after** the store
//!    acknowledges, call [`Model::reset`] on the root: it recursively clears
//!    every dirty tracker and delta queue without touching the data. If the
//!    flush fails, skip the reset and the same update set can be recomputed
//!    for the retry — dirty state is the durable intent until flushed.
//!
//! Loading is the mirror image: [`RootModel::load_root`] populates the whole
//! tree from a source document and then resets it, so freshly loaded data is
//! never dirty.
//!
//! ## Example
//!
//! ```rust
//! use deltadoc::{DotPath, Model, SimpleMap, Update};
//!
//! // an item-count map stored under the "itm" field of its aggregate
//! let mut items: SimpleMap<i32, i32> = SimpleMap::new(DotPath::of("itm"));
//!
//! // state as loaded from the store
//! items.put(2001, 5);
//! items.reset();
//!
//! // one dirty window of application mutations
//! items.put(2002, 1);
//! items.remove(&2001);
//!
//! // the minimal operation set, in mutation-call order
//! let mut ops = Vec::new();
//! items.append_updates(&mut ops);
//! assert_eq!(ops, [
//!     Update::set(&DotPath::of("itm").resolve(2002), 1),
//!     Update::unset(&DotPath::of("itm").resolve(2001)),
//! ]);
//!
//! // the delete payload marks removed keys with their last known value
//! assert_eq!(items.to_delete(), serde_json::json!({"2001": 5}));
//!
//! // after a successful flush
//! items.reset();
//! assert!(!items.updated());
//! ```
//!
//! Composite nodes follow a small amount of convention instead of a derive
//! macro: declare a slot constant per scalar field, guard each setter on
//! value equality, and walk children in field-declaration order. The
//! `tests/aggregate.rs` integration suite contains a complete worked
//! aggregate (player / wallet / equipment / cash).
//!
//! ## Keys: storage vs external
//!
//! Documents and update operations use short **storage keys** (`wt`, `itm`,
//! `_uv`); the `to_update`/`to_delete` payloads use descriptive **external
//! keys** (`wallet`, `items`). The two namespaces are deliberately distinct:
//! the former is the wire format of the store, the latter is for humans and
//! downstream consumers.
//!
//! ## Scope of this Crate
//!
//! This crate is pure in-memory bookkeeping: no operation blocks, suspends,
//! or performs I/O. Network transport, connection pooling, query building,
//! retries, and the concrete binary/text encoding of documents belong to the
//! external document-store driver. An aggregate instance is designed for
//! **single-threaded mutation**: one logical owner mutates, flushes, and
//! resets it; no internal locking exists.
//!
//! ## Features
//!
//! - `serde`: `serde` derives for the driver-facing value types
//!   ([`Update`], [`Timestamp`]). Enabled by default.
//! - `chrono`: `chrono` integration for [`Timestamp`] and `yyyymmdd`
//!   calendar-date scalars. Enabled by default.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod dirty;
pub mod document;
pub mod list;
pub mod maps;
pub mod model;
pub mod path;
pub mod scalar;
pub mod timestamp;
pub mod update;

pub use dirty::DirtyFlags;
pub use document::{Document, LoadError};
pub use list::SimpleList;
pub use maps::{MapKey, ModelMap, SimpleMap};
pub use model::{EntryModel, Model, RootModel};
pub use path::DotPath;
pub use scalar::Scalar;
pub use timestamp::{Timestamp, TimestampError};
pub use update::Update;

// re-exports for downstream models implementing `load` and `to_document`
#[cfg(feature = "chrono")]
pub use chrono;
pub use serde_json;
