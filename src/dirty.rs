// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Per-node dirty-field bookkeeping.
//!
//! Every node type assigns each of its scalar fields a small integer *slot*
//! (a per-type constant, fixed at compile time). [`DirtyFlags`] records which
//! slots have been mutated since the last [`reset`](DirtyFlags::clear); the
//! field setters consult it when deciding which update operations to emit.
//!
//! This is pure local bookkeeping: setting a bit has no propagation side
//! effect. Whether a mutation is visible further up the tree is answered by
//! walking the tree (`Model::updated`), not by signalling.

/// A fixed-capacity set of dirty bits indexed by field slot.
///
/// Capacity is bounded by 64 slots, which is far more than any document node
/// has fields; nodes declare their exact slot count so that misnumbered slots
/// fail fast.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    bits: u64,
    capacity: u32,
}

impl DirtyFlags {
    /// Creates a tracker for `capacity` field slots, all clean.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds 64.
    pub fn new(capacity: u32) -> Self {
        assert!(capacity <= 64, "at most 64 field slots are supported");
        Self { bits: 0, capacity }
    }

    /// Marks `slot` dirty. Idempotent.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the declared capacity.
    pub fn set(&mut self, slot: u32) {
        assert!(slot < self.capacity, "field slot {slot} out of range");
        self.bits |= 1 << slot;
    }

    /// Returns whether `slot` is dirty.
    pub fn get(&self, slot: u32) -> bool {
        assert!(slot < self.capacity, "field slot {slot} out of range");
        self.bits & (1 << slot) != 0
    }

    /// Returns whether any slot is dirty.
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    /// Clears every slot.
    ///
    /// Called by the reset protocol after a successful flush; calling it on an
    /// already-clean tracker is a no-op.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// The number of declared field slots.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

impl std::fmt::Debug for DirtyFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DirtyFlags({:#b}/{})", self.bits, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let flags = DirtyFlags::new(8);
        assert!(!flags.any());
        assert!(!flags.get(0));
    }

    #[test]
    fn set_is_idempotent() {
        let mut flags = DirtyFlags::new(8);
        flags.set(3);
        flags.set(3);
        assert!(flags.get(3));
        assert!(!flags.get(2));
        assert!(flags.any());
    }

    #[test]
    fn clear_resets_everything() {
        let mut flags = DirtyFlags::new(8);
        flags.set(0);
        flags.set(7);
        flags.clear();
        assert!(!flags.any());
        // redundant clear is a no-op
        flags.clear();
        assert!(!flags.any());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_slot_panics() {
        let mut flags = DirtyFlags::new(4);
        flags.set(4);
    }

    #[quickcheck]
    fn any_iff_some_slot_set(slots: Vec<u8>) -> bool {
        let mut flags = DirtyFlags::new(64);
        for slot in &slots {
            flags.set(u32::from(*slot) % 64);
        }
        flags.any() == !slots.is_empty()
    }

    #[quickcheck]
    fn set_slots_are_readable(slots: Vec<u8>) -> bool {
        let mut flags = DirtyFlags::new(64);
        for slot in &slots {
            flags.set(u32::from(*slot) % 64);
        }
        slots.iter().all(|slot| flags.get(u32::from(*slot) % 64))
    }
}
