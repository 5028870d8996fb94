//! # Registry
//!
//! The central container: entity lifecycle, one sparse-set storage per
//! component type, and the per-entity bitmasks views are filtered with.
//!
//! Storage membership and mask bits are always updated together inside a
//! single call, so bit `id(T)` of an entity's mask is set iff the storage
//! for `T` holds a value for that entity.

use crate::bitmask::{ComponentMask, EntityMasks};
use crate::component::{Component, ComponentId, ComponentRegistry};
use crate::config::RegistryConfig;
use crate::entity::{Entity, EntityAllocator};
use crate::error::{EcsError, EcsResult};
use crate::sparse_set::SparseSet;
use crate::storage::{self, ComponentStorage};

/// Snapshot of registry occupancy, for profiling and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Currently alive entities.
    pub alive_entities: usize,
    /// Entity slots ever allocated (alive plus recyclable).
    pub entity_slots: usize,
    /// Registered component types.
    pub component_types: usize,
    /// Mask width per entity, in `u64` words.
    pub mask_words_per_entity: usize,
    /// Component values stored across all storages.
    pub stored_components: usize,
}

/// Entity and component store.
///
/// Single-threaded: nothing here locks, and the borrow checker
/// keeps views from mutating the registry while they run.
///
/// # Example
///
/// ```rust
/// use sparsecs_core::Registry;
///
/// struct Position(f32);
/// struct Velocity(f32);
///
/// let mut registry = Registry::new();
/// let e = registry.create_entity();
/// registry.add(e, Position(0.0));
/// registry.add(e, Velocity(2.0));
///
/// registry.view2::<Position, Velocity, _>(|_, pos, vel| pos.0 += vel.0);
/// assert_eq!(registry.get::<Position>(e).0, 2.0);
/// ```
pub struct Registry {
    pub(crate) entities: EntityAllocator,
    pub(crate) types: ComponentRegistry,
    /// Storages indexed by component id. `None` until a value of that type
    /// is first added (ids may be assigned earlier by views and groups).
    pub(crate) storages: Vec<Option<Box<dyn ComponentStorage>>>,
    pub(crate) masks: EntityMasks,
    /// Page size exponent for newly created storages.
    page_bits: u32,
}

impl Registry {
    /// Creates an empty registry with default configuration.
    #[must_use]
    pub fn new() -> Self {
        let config = RegistryConfig::default();
        Self {
            entities: EntityAllocator::new(),
            types: ComponentRegistry::new(),
            storages: Vec::new(),
            masks: EntityMasks::new(),
            page_bits: config.sparse_page_bits,
        }
    }

    /// Creates a registry from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is out of range.
    pub fn with_config(config: &RegistryConfig) -> EcsResult<Self> {
        config.validate()?;

        let mut masks = EntityMasks::new();
        masks.reserve(config.initial_entity_capacity);

        Ok(Self {
            entities: EntityAllocator::with_capacity(config.initial_entity_capacity),
            types: ComponentRegistry::with_capacity(config.initial_component_capacity),
            storages: Vec::with_capacity(config.initial_component_capacity),
            masks,
            page_bits: config.sparse_page_bits,
        })
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates an entity, recycling a freed slot if one is available.
    ///
    /// Recycled slots come back with their bumped generation; fresh slots
    /// start at generation 1. The slot's mask is all zero.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.allocate();
        self.masks.ensure_entities(entity.index() as usize + 1);
        entity
    }

    /// Destroys an entity and every component attached to it.
    ///
    /// Returns `false` (no-op) if the handle is not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.free(entity) {
            return false;
        }

        let index = entity.index();
        for storage in self.storages.iter_mut().flatten() {
            storage.erase_key(index);
        }
        self.masks.zero(index as usize);

        tracing::trace!(
            index,
            generation = self.entities.generation_of(index),
            "destroyed entity"
        );
        true
    }

    /// Checks whether the handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of alive entities.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Number of entity slots ever allocated.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.entities.slot_count()
    }

    /// Iterates over all alive entities in slot order.
    pub fn alive_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    /// Destroys every entity. Component type ids stay assigned.
    pub fn clear(&mut self) {
        let alive: Vec<Entity> = self.entities.iter_alive().collect();
        for entity in alive {
            self.entities.free(entity);
        }
        for storage in self.storages.iter_mut().flatten() {
            storage.clear();
        }
        self.masks.zero_all();
    }

    // =========================================================================
    // Component type ids
    // =========================================================================

    /// Id of `T`, assigning one on first use.
    ///
    /// A new id may widen every entity's mask (O(entity slots), once per
    /// 64 component types).
    pub fn component_id<T: Component>(&mut self) -> ComponentId {
        let (id, registered) = self.types.get_or_register::<T>();
        if registered {
            self.storages.push(None);
            self.masks.ensure_bits(self.types.len());
        }
        id
    }

    /// Id of `T`, if already assigned.
    #[inline]
    #[must_use]
    pub fn component_id_of<T: Component>(&self) -> Option<ComponentId> {
        self.types.get::<T>()
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.types.len()
    }

    // =========================================================================
    // Component access
    // =========================================================================

    /// Attaches `value` to `entity`, overwriting any existing `T`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive. Use [`Registry::try_add`] for a
    /// checked variant.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        assert!(
            self.is_alive(entity),
            "add::<{}> on dead entity {entity}",
            std::any::type_name::<T>()
        );
        self.insert_unchecked(entity, value)
    }

    /// Attaches `value` to `entity` if it is alive.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DeadEntity`] if the handle is stale.
    pub fn try_add<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<&mut T> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        Ok(self.insert_unchecked(entity, value))
    }

    /// Checks whether `entity` is alive and carries a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.is_alive(entity)
            && self
                .storage::<T>()
                .is_some_and(|set| set.contains(entity.index()))
    }

    /// Returns the `T` attached to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is dead or has no `T`.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        match self.try_get(entity) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns the `T` attached to `entity` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is dead or has no `T`.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        match self.try_get_mut(entity) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns the `T` attached to `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] if the handle is stale,
    /// [`EcsError::MissingComponent`] if no `T` is attached.
    pub fn try_get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.storage::<T>()
            .and_then(|set| set.try_get(entity.index()))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Returns the `T` attached to `entity` mutably.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::try_get`].
    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.storage_mut::<T>()
            .and_then(|set| set.try_get_mut(entity.index()))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Detaches and returns the `T` of `entity`.
    ///
    /// No-op returning `None` if the entity is dead or has no `T`.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        let id = self.types.get::<T>()?;
        let value = self.storage_mut::<T>()?.erase(entity.index())?;
        self.masks.clear(entity.index() as usize, id.index());
        Some(value)
    }

    /// Storage for `T`, if any value of `T` was ever added.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        let id = self.types.get::<T>()?;
        let erased = self.storages.get(id.index())?.as_deref()?;
        Some(storage::downcast_ref::<T>(erased))
    }

    /// Mutable storage for `T`. Inserting or erasing through it bypasses
    /// the entity masks, so it stays inside the crate.
    pub(crate) fn storage_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        let id = self.types.get::<T>()?;
        let erased = self.storages.get_mut(id.index())?.as_deref_mut()?;
        Some(storage::downcast_mut::<T>(erased))
    }

    /// Iterates every `T` mutably, paired with its entity, in dense order.
    ///
    /// Only values are reachable, so attachment stays in step with the
    /// entity masks. Structural changes go through [`Registry::add`] and
    /// [`Registry::remove`]:
    ///
    /// ```compile_fail
    /// use sparsecs_core::Registry;
    ///
    /// let mut registry = Registry::new();
    /// let e = registry.create_entity();
    /// registry.add(e, 1u32);
    /// registry.storage_mut::<u32>().map(|set| set.erase(e.index()));
    /// ```
    pub fn components_mut<T: Component>(
        &mut self,
    ) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        let Self {
            entities,
            types,
            storages,
            ..
        } = self;
        let erased = match types.get::<T>() {
            Some(id) => storages.get_mut(id.index()).and_then(|slot| slot.as_deref_mut()),
            None => None,
        };
        let set = erased.map(|erased| storage::downcast_mut::<T>(erased));
        let entities = &*entities;

        set.map(SparseSet::iter_mut)
            .into_iter()
            .flatten()
            .map(move |(key, value)| {
                let entity = entities
                    .generation_of(key)
                    .map_or(Entity::NULL, |generation| Entity::new(key, generation));
                (entity, value)
            })
    }

    // =========================================================================
    // Masks
    // =========================================================================

    /// Required-bit mask for a list of component ids, at the current width.
    pub(crate) fn mask_for(&self, ids: &[ComponentId]) -> ComponentMask {
        let mut mask = ComponentMask::with_words(self.masks.words_per_entity());
        for id in ids {
            mask.set(id.index());
        }
        mask
    }

    /// Occupancy snapshot.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            alive_entities: self.entities.alive_count(),
            entity_slots: self.entities.slot_count(),
            component_types: self.types.len(),
            mask_words_per_entity: self.masks.words_per_entity(),
            stored_components: self.storages.iter().flatten().map(|s| s.len()).sum(),
        }
    }

    /// Inserts into the storage of `T` and sets the mask bit. Caller checked
    /// liveness.
    fn insert_unchecked<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        let id = self.component_id::<T>();
        let index = entity.index();
        self.masks.set(index as usize, id.index());

        let page_bits = self.page_bits;
        let slot = &mut self.storages[id.index()];
        let erased = slot.get_or_insert_with(|| -> Box<dyn ComponentStorage> {
            Box::new(SparseSet::<T>::with_page_bits(page_bits))
        });
        storage::downcast_mut::<T>(&mut **erased).insert(index, value)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn missing<T: Component>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        component: std::any::type_name::<T>(),
    }
}
