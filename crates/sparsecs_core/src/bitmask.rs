//! # Component Bitmasks
//!
//! Every entity slot owns a fixed number of `u64` words recording which
//! component types it carries. All slots share one flat buffer:
//!
//! ```text
//! words: [e0w0, e0w1, e1w0, e1w1, e2w0, e2w1, ...]
//!         \_ entity 0 _/  \_ entity 1 _/
//! index = entity * words_per_entity + word
//! ```
//!
//! When a new component type pushes the bit count past the current width,
//! the whole buffer is reallocated at the new width and copied. The width
//! never shrinks.

/// Bits per mask word.
pub const WORD_BITS: usize = 64;

/// Number of words needed to hold `bits` bits.
#[inline]
#[must_use]
pub const fn words_for_bits(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

#[inline]
const fn split(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}

/// A standalone set of required component bits.
///
/// Used as the query mask of views and groups. An entity matches when its
/// own mask is a superset of this one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask {
    words: Vec<u64>,
}

impl ComponentMask {
    /// Creates an empty mask.
    #[must_use]
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Creates an all-zero mask `words` words wide.
    #[must_use]
    pub fn with_words(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    /// Sets `bit`, widening the mask if needed.
    pub fn set(&mut self, bit: usize) {
        let (word, mask) = split(bit);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= mask;
    }

    /// Clears `bit`.
    pub fn clear(&mut self, bit: usize) {
        let (word, mask) = split(bit);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !mask;
        }
    }

    /// Checks if `bit` is set.
    #[must_use]
    pub fn contains(&self, bit: usize) -> bool {
        let (word, mask) = split(bit);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Raw words.
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Checks `candidate & self == self`.
    ///
    /// The slices may differ in length: words missing on either side count
    /// as zero.
    #[must_use]
    pub fn is_subset_of(&self, candidate: &[u64]) -> bool {
        self.words.iter().enumerate().all(|(i, &required)| {
            let have = candidate.get(i).copied().unwrap_or(0);
            have & required == required
        })
    }
}

/// Flat per-entity bitmask arena.
#[derive(Debug, Default)]
pub struct EntityMasks {
    /// `entity_count * words_per_entity` words.
    words: Vec<u64>,
    /// Current mask width in words.
    words_per_entity: usize,
    /// Number of entity slots covered.
    entity_count: usize,
    /// Slots to keep room for, applied again whenever the width grows.
    reserved_entities: usize,
}

impl EntityMasks {
    /// Creates an empty arena (zero slots, zero width).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mask width in words.
    #[inline]
    #[must_use]
    pub const fn words_per_entity(&self) -> usize {
        self.words_per_entity
    }

    /// Number of entity slots covered.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Reserves room for `additional` more slots.
    ///
    /// The request is remembered, so a later widening allocates the new
    /// buffer at that capacity too.
    pub fn reserve(&mut self, additional: usize) {
        self.reserved_entities = self
            .reserved_entities
            .max(self.entity_count + additional);
        self.words.reserve(additional * self.words_per_entity);
    }

    /// Slots the buffer can hold at the current width without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        if self.words_per_entity == 0 {
            return self.reserved_entities.max(self.entity_count);
        }
        self.words.capacity() / self.words_per_entity
    }

    /// Grows coverage to at least `entities` slots; new slots are zeroed.
    pub fn ensure_entities(&mut self, entities: usize) {
        if entities > self.entity_count {
            self.entity_count = entities;
            self.words.resize(entities * self.words_per_entity, 0);
        }
    }

    /// Widens every slot's mask to hold at least `bits` bits.
    ///
    /// Returns `true` if the buffer was reallocated. O(slots) when it grows.
    pub fn ensure_bits(&mut self, bits: usize) -> bool {
        let new_width = words_for_bits(bits);
        if new_width <= self.words_per_entity {
            return false;
        }

        let old_width = self.words_per_entity;
        let slots = self.entity_count.max(self.reserved_entities);
        let mut words = Vec::with_capacity(slots * new_width);
        words.resize(self.entity_count * new_width, 0u64);
        if old_width > 0 {
            for (new_mask, old_mask) in words
                .chunks_exact_mut(new_width)
                .zip(self.words.chunks_exact(old_width))
            {
                new_mask[..old_width].copy_from_slice(old_mask);
            }
        }

        tracing::debug!(
            old_width,
            new_width,
            entities = self.entity_count,
            "widened entity component masks"
        );

        self.words = words;
        self.words_per_entity = new_width;
        true
    }

    /// Mask words of slot `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not covered.
    #[inline]
    #[must_use]
    pub fn mask(&self, entity: usize) -> &[u64] {
        let start = entity * self.words_per_entity;
        &self.words[start..start + self.words_per_entity]
    }

    /// Sets `bit` for slot `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not covered or the mask is too narrow.
    #[inline]
    pub fn set(&mut self, entity: usize, bit: usize) {
        let (word, mask) = split(bit);
        assert!(word < self.words_per_entity, "component bit {bit} outside mask width");
        self.words[entity * self.words_per_entity + word] |= mask;
    }

    /// Clears `bit` for slot `entity`. Bits outside the width are already clear.
    #[inline]
    pub fn clear(&mut self, entity: usize, bit: usize) {
        let (word, mask) = split(bit);
        if word < self.words_per_entity {
            self.words[entity * self.words_per_entity + word] &= !mask;
        }
    }

    /// Checks `bit` for slot `entity`.
    #[inline]
    #[must_use]
    pub fn test(&self, entity: usize, bit: usize) -> bool {
        let (word, mask) = split(bit);
        word < self.words_per_entity
            && self.words[entity * self.words_per_entity + word] & mask != 0
    }

    /// Zeroes every bit of slot `entity`.
    pub fn zero(&mut self, entity: usize) {
        let start = entity * self.words_per_entity;
        self.words[start..start + self.words_per_entity].fill(0);
    }

    /// Zeroes every slot.
    pub fn zero_all(&mut self) {
        self.words.fill(0);
    }

    /// Checks that slot `entity` carries every bit of `required`.
    #[inline]
    #[must_use]
    pub fn matches(&self, entity: usize, required: &ComponentMask) -> bool {
        required.is_subset_of(self.mask(entity))
    }
}
