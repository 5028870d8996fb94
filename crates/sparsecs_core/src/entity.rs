//! # Entity Management
//!
//! Entities are lightweight value handles consisting of:
//! - An index into the sparse component arrays (a recycled slot)
//! - A generation counter for detecting stale handles after reuse

use std::fmt;

/// Opaque handle to an entity.
///
/// Two handles are equal iff both the index and the generation match. A
/// handle never owns anything; liveness is always re-checked through the
/// registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Sentinel handle meaning "no entity".
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Creates a handle from a slot index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Checks if this handle is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }

    /// Packs the handle into 64 bits.
    ///
    /// - Lower 32 bits: index
    /// - Upper 32 bits: generation
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpacks a handle produced by [`Entity::to_bits`].
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}

/// Per-slot bookkeeping.
#[derive(Clone, Copy, Debug)]
struct Slot {
    /// Generation handed out by the next (or current) allocation.
    generation: u32,
    /// Whether this slot is currently alive.
    alive: bool,
}

/// Slot allocator with generation tracking and index recycling.
///
/// Slot state machine: `Free -> Alive(g)` on allocate, `Alive(g) -> Free`
/// on free (stored generation becomes `g + 1`), `Free -> Alive(g + 1)` on
/// the next allocate of that slot.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Every slot ever allocated.
    slots: Vec<Slot>,
    /// Free list of slot indices for reuse (LIFO).
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl EntityAllocator {
    /// Generation given to a slot the first time it is allocated.
    pub const FIRST_GENERATION: u32 = 1;

    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with room for `capacity` slots before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::with_capacity(capacity),
            alive_count: 0,
        }
    }

    /// Allocates a handle, reusing the most recently freed slot first.
    ///
    /// # Panics
    ///
    /// Panics if all slot indices are in use. Index `u32::MAX` is never
    /// handed out, so no live handle can equal [`Entity::NULL`].
    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            return Entity::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|&i| i != u32::MAX)
            .expect("entity index space exhausted");
        self.slots.push(Slot {
            generation: Self::FIRST_GENERATION,
            alive: true,
        });
        Entity::new(index, Self::FIRST_GENERATION)
    }

    /// Frees a live handle's slot, bumping its generation.
    ///
    /// Returns `false` (and does nothing) if the handle is not alive.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index() as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.alive = false;
        self.free_indices.push(entity.index());
        self.alive_count -= 1;
        true
    }

    /// Checks if the handle's index is allocated and its generation current.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    /// Current generation stored for `index`, if the slot exists.
    #[inline]
    #[must_use]
    pub fn generation_of(&self, index: u32) -> Option<u32> {
        self.slots.get(index as usize).map(|slot| slot.generation)
    }

    /// Number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of slots ever allocated (alive plus free).
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over all alive handles in slot order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| Entity::new(index as u32, slot.generation))
    }
}
