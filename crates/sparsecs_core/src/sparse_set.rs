//! # Sparse-Set Storage
//!
//! Associative container mapping a dense `u32` key (an entity index) to a
//! value, with O(1) insert/contains/get/erase and packed iteration.
//!
//! ```text
//! sparse pages:  [page 0][  --  ][page 2]     (only touched pages exist)
//!                    |               |
//!   sparse[k] ------>+---------------+--> index into the dense arrays
//!
//! keys:    [k0, k1, k2, ...]
//! values:  [v0, v1, v2, ...]    values[i] belongs to keys[i]
//! ```
//!
//! Erasing moves the last dense element into the vacated slot and patches
//! the moved key's sparse entry, so iteration order is not preserved
//! across erasures.

use std::ops::{Index, IndexMut};

/// Default page size exponent: 2048 sparse slots per page.
pub const DEFAULT_PAGE_BITS: u32 = 11;

/// Largest accepted page size exponent (65536 slots per page).
pub const MAX_PAGE_BITS: u32 = 16;

/// Sparse slot marker for "no entry". Also the one key that cannot be stored.
const EMPTY: u32 = u32::MAX;

/// Paged sparse set from `u32` keys to `T`.
///
/// # Example
///
/// ```rust
/// use sparsecs_core::SparseSet;
///
/// let mut set = SparseSet::new();
/// set.insert(42, "answer");
/// assert!(set.contains(42));
/// assert_eq!(set[42], "answer");
/// assert_eq!(set.erase(42), Some("answer"));
/// assert!(set.is_empty());
/// ```
///
/// Dense positions move on every erase and are not exposed:
///
/// ```compile_fail
/// use sparsecs_core::SparseSet;
///
/// let mut set = SparseSet::new();
/// set.insert(1, ());
/// let _ = set.dense_index(1);
/// ```
pub struct SparseSet<T> {
    /// Lazily allocated sparse pages; each slot holds a dense index or `EMPTY`.
    pages: Vec<Option<Box<[u32]>>>,
    /// log2 of the page size.
    page_bits: u32,
    /// Packed keys, in lockstep with `values`.
    keys: Vec<u32>,
    /// Packed values.
    values: Vec<T>,
}

impl<T> SparseSet<T> {
    /// Creates an empty set with 2048-slot pages.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pages: Vec::new(),
            page_bits: DEFAULT_PAGE_BITS,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an empty set whose pages hold `1 << page_bits` slots.
    ///
    /// # Panics
    ///
    /// Panics if `page_bits` is not in `1..=16`.
    #[must_use]
    pub fn with_page_bits(page_bits: u32) -> Self {
        assert!(
            (1..=MAX_PAGE_BITS).contains(&page_bits),
            "page_bits must be in 1..={MAX_PAGE_BITS}, got {page_bits}"
        );
        Self {
            page_bits,
            ..Self::new()
        }
    }

    /// Creates an empty set with dense room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Number of slots per sparse page.
    #[inline]
    #[must_use]
    pub const fn page_size(&self) -> usize {
        1 << self.page_bits
    }

    /// Number of sparse pages currently allocated.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.iter().filter(|page| page.is_some()).count()
    }

    /// Number of stored entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Alias of [`SparseSet::len`].
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Checks whether `key` has a value.
    ///
    /// False if the key's page was never allocated, if its slot is empty, or
    /// if the dense entry it points at belongs to another key.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.dense_index(key).is_some()
    }

    /// Position of `key` in the packed arrays. Shifts on every erase.
    #[inline]
    fn dense_index(&self, key: u32) -> Option<usize> {
        let (page, offset) = self.locate(key);
        let slot = *self.pages.get(page)?.as_ref()?.get(offset)?;
        if slot == EMPTY {
            return None;
        }

        let dense = slot as usize;
        (self.keys.get(dense) == Some(&key)).then_some(dense)
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// An existing value is replaced in place (no reordering); a new key is
    /// appended to the packed arrays.
    ///
    /// # Panics
    ///
    /// Panics if `key` is `u32::MAX`, which is reserved.
    #[allow(clippy::cast_possible_truncation)]
    pub fn insert(&mut self, key: u32, value: T) -> &mut T {
        assert_ne!(key, EMPTY, "key u32::MAX is reserved");

        if let Some(dense) = self.dense_index(key) {
            let slot = &mut self.values[dense];
            *slot = value;
            return slot;
        }

        // At most u32::MAX distinct keys exist, so the dense index fits.
        let dense = self.keys.len() as u32;
        *self.sparse_slot_mut(key) = dense;
        self.keys.push(key);
        self.values.push(value);

        let last = self.values.len() - 1;
        &mut self.values[last]
    }

    /// Removes `key` and returns its value; `None` (no-op) if absent.
    ///
    /// The last packed entry moves into the vacated position.
    #[allow(clippy::cast_possible_truncation)]
    pub fn erase(&mut self, key: u32) -> Option<T> {
        let dense = self.dense_index(key)?;
        let last = self.keys.len() - 1;

        self.keys.swap_remove(dense);
        let value = self.values.swap_remove(dense);

        if dense != last {
            let moved = self.keys[dense];
            *self.sparse_slot_mut(moved) = dense as u32;
        }
        *self.sparse_slot_mut(key) = EMPTY;

        Some(value)
    }

    /// Returns the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent. Check [`SparseSet::contains`] first or use
    /// [`SparseSet::try_get`].
    #[inline]
    #[must_use]
    pub fn get(&self, key: u32) -> &T {
        match self.dense_index(key) {
            Some(dense) => &self.values[dense],
            None => panic!("sparse set has no entry for key {key}"),
        }
    }

    /// Returns the value for `key` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    #[inline]
    pub fn get_mut(&mut self, key: u32) -> &mut T {
        match self.dense_index(key) {
            Some(dense) => &mut self.values[dense],
            None => panic!("sparse set has no entry for key {key}"),
        }
    }

    /// Returns the value for `key`, or `None` if absent.
    #[inline]
    #[must_use]
    pub fn try_get(&self, key: u32) -> Option<&T> {
        self.dense_index(key).map(|dense| &self.values[dense])
    }

    /// Returns the value for `key` mutably, or `None` if absent.
    #[inline]
    pub fn try_get_mut(&mut self, key: u32) -> Option<&mut T> {
        self.dense_index(key).map(|dense| &mut self.values[dense])
    }

    /// Packed keys in dense order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// Packed values in dense order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Packed values in dense order, mutably.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Iterates `(key, &value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.keys.iter().copied().zip(self.values.iter())
    }

    /// Iterates `(key, &mut value)` pairs in dense order.
    ///
    /// Values may be changed in place; the set itself cannot be inserted
    /// into or erased from while the iterator is alive.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.keys.iter().copied().zip(self.values.iter_mut())
    }

    /// Calls `f` with every `(key, &mut value)` pair in dense order.
    pub fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, &mut T),
    {
        for (key, value) in self.keys.iter().copied().zip(self.values.iter_mut()) {
            f(key, value);
        }
    }

    /// Removes every entry. Allocated pages are kept for reuse.
    pub fn clear(&mut self) {
        let keys = std::mem::take(&mut self.keys);
        for &key in &keys {
            *self.sparse_slot_mut(key) = EMPTY;
        }
        self.keys = keys;
        self.keys.clear();
        self.values.clear();
    }

    /// Splits a key into (page index, offset within page).
    #[inline]
    fn locate(&self, key: u32) -> (usize, usize) {
        let mask = (1u32 << self.page_bits) - 1;
        ((key >> self.page_bits) as usize, (key & mask) as usize)
    }

    /// Mutable sparse slot for `key`, allocating its page on first touch.
    fn sparse_slot_mut(&mut self, key: u32) -> &mut u32 {
        let (page, offset) = self.locate(key);
        if page >= self.pages.len() {
            self.pages.resize_with(page + 1, || None);
        }

        let page_size = self.page_size();
        let slots = self.pages[page].get_or_insert_with(|| {
            tracing::trace!(page, page_size, "allocated sparse page");
            vec![EMPTY; page_size].into_boxed_slice()
        });
        &mut slots[offset]
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for SparseSet<T> {
    type Output = T;

    fn index(&self, key: u32) -> &T {
        self.get(key)
    }
}

impl<T> IndexMut<u32> for SparseSet<T> {
    fn index_mut(&mut self, key: u32) -> &mut T {
        self.get_mut(key)
    }
}
