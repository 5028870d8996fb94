//! # Type-Erased Component Storage
//!
//! The registry keeps one [`SparseSet`] per component type behind this
//! trait, so entity destruction can sweep every storage without knowing the
//! concrete types. Typed access goes through a checked downcast.

use std::any::Any;

use crate::component::Component;
use crate::sparse_set::SparseSet;

/// Operations the registry needs on a storage of unknown component type.
pub trait ComponentStorage: Any {
    /// Removes the value stored for `key`, if any. Returns whether one existed.
    fn erase_key(&mut self, key: u32) -> bool;

    /// Checks whether `key` has a value.
    fn contains_key(&self, key: u32) -> bool;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored value.
    fn clear(&mut self);

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentStorage for SparseSet<T> {
    fn erase_key(&mut self, key: u32) -> bool {
        self.erase(key).is_some()
    }

    fn contains_key(&self, key: u32) -> bool {
        self.contains(key)
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn clear(&mut self) {
        SparseSet::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Downcasts an erased storage to the set for `T`.
///
/// # Panics
///
/// Panics if the storage holds another type. The registry indexes storages
/// by component id, so a mismatch is an internal bookkeeping bug.
#[inline]
pub(crate) fn downcast_ref<T: Component>(storage: &dyn ComponentStorage) -> &SparseSet<T> {
    match storage.as_any().downcast_ref::<SparseSet<T>>() {
        Some(set) => set,
        None => panic!("storage type mismatch for {}", std::any::type_name::<T>()),
    }
}

/// Mutable counterpart of [`downcast_ref`].
///
/// # Panics
///
/// Panics if the storage holds another type.
#[inline]
pub(crate) fn downcast_mut<T: Component>(storage: &mut dyn ComponentStorage) -> &mut SparseSet<T> {
    match storage.as_any_mut().downcast_mut::<SparseSet<T>>() {
        Some(set) => set,
        None => panic!("storage type mismatch for {}", std::any::type_name::<T>()),
    }
}
