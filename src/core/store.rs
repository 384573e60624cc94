//! Slot-indexed object store.
//!
//! Entities are addressed by generation-checked keys instead of pointers.
//! A key stays comparable and copyable after its entity is erased; it simply
//! stops resolving, so stale handles are detected instead of dereferenced.

use slotmap::{Key, SlotMap};

/// Index/generation view over any slotmap key.
pub trait HandleExt: Key {
    /// Slot index. Doubles as the bindless index for device resources.
    fn index(&self) -> u32 {
        (self.data().as_ffi() & 0xffff_ffff) as u32
    }

    /// Generation of the slot when this handle was issued.
    fn generation(&self) -> u32 {
        (self.data().as_ffi() >> 32) as u32
    }
}

impl<K: Key> HandleExt for K {}

/// Stable-handle container backing the world and the headless device.
#[derive(Debug, Clone)]
pub struct ObjectStore<K: Key, V> {
    slots: SlotMap<K, V>,
}

impl<K: Key, V> Default for ObjectStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V> ObjectStore<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Stores `value`, reusing a freed slot with a bumped generation when one exists.
    pub fn emplace(&mut self, value: V) -> K {
        self.slots.insert(value)
    }

    /// Stores a value built from its own handle.
    pub fn emplace_with(&mut self, f: impl FnOnce(K) -> V) -> K {
        self.slots.insert_with_key(f)
    }

    /// Invalidates `handle` and returns the value it referred to.
    pub fn erase(&mut self, handle: K) -> Option<V> {
        self.slots.remove(handle)
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self, handle: K) -> bool {
        self.slots.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: K) -> Option<&V> {
        self.slots.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: K) -> Option<&mut V> {
        self.slots.get_mut(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut V)> {
        self.slots.iter_mut()
    }

    /// Snapshot of all live handles in iteration order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.slots.keys().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
