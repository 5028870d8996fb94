//! # Component Types
//!
//! Components are plain data attached to entities. Every component type is
//! given a compact numeric id the first time the registry sees it; ids are
//! handed out in first-use order and never reused.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type, so any owned value can be
/// attached to an entity.
///
/// # Example
///
/// ```rust
/// use sparsecs_core::Registry;
///
/// struct Health(u32);
///
/// let mut registry = Registry::new();
/// let e = registry.create_entity();
/// registry.add(e, Health(100));
/// assert_eq!(registry.get::<Health>(e).0, 100);
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Dense, zero-based id of a registered component type.
///
/// This id is the bit position used in entity masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Creates an id from its raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Id as an index into per-type tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mapping from component type identity to [`ComponentId`].
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    ids: HashMap<TypeId, ComponentId>,
    /// Type names indexed by id, for diagnostics.
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    /// Creates an empty type table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a type table with room for `capacity` types.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Id of `T`, if already registered.
    #[inline]
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<ComponentId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Id of `T`, assigning the next free id on first use.
    ///
    /// Returns the id and whether it was newly assigned.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` component types are registered.
    pub fn get_or_register<T: Component>(&mut self) -> (ComponentId, bool) {
        if let Some(id) = self.get::<T>() {
            return (id, false);
        }

        let raw = u32::try_from(self.names.len()).expect("component id space exhausted");
        let id = ComponentId(raw);
        let name = std::any::type_name::<T>();
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.push(name);

        tracing::debug!(
            component = name,
            id = raw,
            registered = self.names.len(),
            "registered component type"
        );
        (id, true)
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no type has been registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Type name registered under `id`.
    #[must_use]
    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }
}
