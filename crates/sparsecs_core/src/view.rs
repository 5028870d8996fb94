//! # Views and Groups
//!
//! A view visits every entity carrying all of its component types:
//!
//! 1. Build the required mask (assigning ids to unseen types).
//! 2. If any storage was never created, visit nothing.
//! 3. Drive from the smallest storage, skip entries whose entity mask is
//!    not a superset of the required mask.
//! 4. Hand the visitor the entity and `&mut` references to each component.
//!
//! Visitation follows the driving storage's dense order, which changes as
//! values are erased. The visitor only sees component references, so it
//! cannot add, remove or destroy while the traversal runs.

use crate::bitmask::ComponentMask;
use crate::component::{Component, ComponentId};
use crate::entity::Entity;
use crate::registry::Registry;
use crate::storage;

/// Precomputed required-component mask for membership tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    required: ComponentMask,
    len: usize,
}

impl Group {
    /// Required component bits.
    #[must_use]
    pub fn required(&self) -> &ComponentMask {
        &self.required
    }

    /// Number of distinct required component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the group requires nothing (every live entity matches).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A tuple of component types, e.g. `(Position, Velocity)`.
pub trait ComponentSet {
    /// Ids of every type in the tuple, registering unseen ones.
    fn component_ids(registry: &mut Registry) -> Vec<ComponentId>;
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: Component),+> ComponentSet for ($($T,)+) {
            fn component_ids(registry: &mut Registry) -> Vec<ComponentId> {
                vec![$(registry.component_id::<$T>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

impl Registry {
    /// Builds the required mask for the component tuple `S`.
    ///
    /// ```rust
    /// use sparsecs_core::Registry;
    ///
    /// struct Position;
    /// struct Velocity;
    ///
    /// let mut registry = Registry::new();
    /// let moving = registry.create_group::<(Position, Velocity)>();
    ///
    /// let e = registry.create_entity();
    /// registry.add(e, Position);
    /// assert!(!registry.matches_group(e, &moving));
    /// registry.add(e, Velocity);
    /// assert!(registry.matches_group(e, &moving));
    /// ```
    pub fn create_group<S: ComponentSet>(&mut self) -> Group {
        let mut ids = S::component_ids(self);
        let required = self.mask_for(&ids);
        ids.sort_unstable();
        ids.dedup();
        Group {
            required,
            len: ids.len(),
        }
    }

    /// Checks whether `entity` is alive and carries every type of `group`.
    ///
    /// Groups built before later component types widened the masks stay
    /// valid.
    #[must_use]
    pub fn matches_group(&self, entity: Entity, group: &Group) -> bool {
        self.is_alive(entity)
            && group
                .required
                .is_subset_of(self.masks.mask(entity.index() as usize))
    }
}

macro_rules! impl_view {
    ($(#[$doc:meta])* $name:ident => $($T:ident $var:ident $n:tt),+) => {
        impl Registry {
            $(#[$doc])*
            ///
            /// # Panics
            ///
            /// Panics if the same component type appears twice.
            pub fn $name<$($T: Component,)+ V>(&mut self, mut visitor: V)
            where
                V: FnMut(Entity, $(&mut $T),+),
            {
                let ids = [$(self.component_id::<$T>()),+];
                let required = self.mask_for(&ids);

                let Self {
                    entities,
                    storages,
                    masks,
                    ..
                } = self;

                let Ok([$($var),+]) = storages.get_disjoint_mut([$(ids[$n].index()),+]) else {
                    panic!("view component types must be distinct");
                };
                $(
                    let Some($var) = $var.as_deref_mut() else {
                        return;
                    };
                    let $var = storage::downcast_mut::<$T>($var);
                )+

                let (driver, driver_len) = [$($var.len()),+]
                    .into_iter()
                    .enumerate()
                    .min_by_key(|&(_, len)| len)
                    .unwrap_or((0, 0));

                for i in 0..driver_len {
                    let key = match driver {
                        $($n => $var.keys()[i],)+
                        _ => unreachable!("driver index out of range"),
                    };
                    if !masks.matches(key as usize, &required) {
                        continue;
                    }
                    let entity = entities
                        .generation_of(key)
                        .map_or(Entity::NULL, |generation| Entity::new(key, generation));
                    visitor(entity, $($var.get_mut(key)),+);
                }
            }
        }
    };
}

impl_view!(
    /// Visits every entity carrying an `A`.
    view => A a 0
);
impl_view!(
    /// Visits every entity carrying both `A` and `B`.
    view2 => A a 0, B b 1
);
impl_view!(
    /// Visits every entity carrying `A`, `B` and `C`.
    view3 => A a 0, B b 1, C c 2
);
impl_view!(
    /// Four-component view.
    view4 => A a 0, B b 1, C c 2, D d 3
);
impl_view!(
    /// Five-component view.
    view5 => A a 0, B b 1, C c 2, D d 3, E e 4
);
impl_view!(
    /// Six-component view.
    view6 => A a 0, B b 1, C c 2, D d 3, E e 4, F f 5
);
