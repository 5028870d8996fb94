//! # SPARSECS Core
//!
//! Sparse-set Entity Component Store designed for:
//! - O(1) amortized add / get / remove per component
//! - Packed, cache-friendly iteration over each component type
//! - Stale-handle detection through generation counters
//!
//! ## Architecture
//!
//! 1. **One sparse set per component type** - paged sparse index, packed
//!    dense keys and values, swap-removal
//! 2. **Per-entity bitmask** - bit `id(T)` is set iff the entity carries a `T`
//! 3. **Views** - drive from the smallest storage, filter by mask
//!
//! ## Example
//!
//! ```rust
//! use sparsecs_core::Registry;
//!
//! struct Position { x: f32 }
//! struct Velocity { dx: f32 }
//!
//! let mut registry = Registry::new();
//! let player = registry.create_entity();
//! registry.add(player, Position { x: 0.0 });
//! registry.add(player, Velocity { dx: 1.5 });
//!
//! registry.view2::<Position, Velocity, _>(|_, pos, vel| pos.x += vel.dx);
//! assert_eq!(registry.get::<Position>(player).x, 1.5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bitmask;
pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod registry;
pub mod sparse_set;
pub mod storage;
pub mod view;

pub use bitmask::{ComponentMask, EntityMasks};
pub use component::{Component, ComponentId, ComponentRegistry};
pub use config::RegistryConfig;
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, EcsResult};
pub use registry::{Registry, RegistryStats};
pub use sparse_set::{SparseSet, DEFAULT_PAGE_BITS, MAX_PAGE_BITS};
pub use storage::ComponentStorage;
pub use view::{ComponentSet, Group};
