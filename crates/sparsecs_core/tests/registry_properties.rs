//! # Registry Property Tests
//!
//! Randomized checks of the registry against a brute-force model:
//!
//! 1. **Random access**: every stored value reads back after arbitrary churn
//! 2. **Views**: a view visits exactly the entities `has` reports, once each
//! 3. **Lifecycle**: recycled slots never revive stale handles
//!
//! Run with: cargo test --test registry_properties

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sparsecs_core::{Entity, Registry, SparseSet};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Health(u32);

// ============================================================================
// SPARSE SET
// ============================================================================

#[test]
fn random_permutation_insert_erase_leaves_set_empty() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    let mut keys: Vec<u32> = (0..100_000).collect();
    keys.shuffle(&mut rng);

    let mut set = SparseSet::new();
    for &key in &keys {
        set.insert(key, u64::from(key) * 3);
    }
    assert_eq!(set.size(), 100_000);

    keys.shuffle(&mut rng);
    for &key in &keys {
        assert_eq!(set.erase(key), Some(u64::from(key) * 3));
    }
    assert_eq!(set.size(), 0);
    assert!(set.is_empty());
}

#[test]
fn random_access_after_interleaved_churn() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut set = SparseSet::new();
    let mut model: HashMap<u32, u32> = HashMap::new();

    for step in 0..50_000u32 {
        let key = rng.gen_range(0..20_000);
        if rng.gen_bool(0.6) {
            set.insert(key, step);
            model.insert(key, step);
        } else {
            assert_eq!(set.erase(key), model.remove(&key));
        }
    }

    assert_eq!(set.len(), model.len());
    for (&key, &value) in &model {
        assert_eq!(set[key], value);
    }
    for (key, value) in set.iter() {
        assert_eq!(model.get(&key), Some(value));
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
fn components_read_back_after_random_churn() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut registry = Registry::new();
    let mut model: HashMap<Entity, (Option<Position>, Option<Health>)> = HashMap::new();
    let mut alive: Vec<Entity> = Vec::new();

    for step in 0..20_000u32 {
        match rng.gen_range(0..6) {
            0 | 1 => {
                let e = registry.create_entity();
                alive.push(e);
                model.insert(e, (None, None));
            }
            2 if !alive.is_empty() => {
                let e = alive.swap_remove(rng.gen_range(0..alive.len()));
                assert!(registry.destroy_entity(e));
                model.remove(&e);
            }
            3 if !alive.is_empty() => {
                let e = alive[rng.gen_range(0..alive.len())];
                #[allow(clippy::cast_precision_loss)]
                let pos = Position {
                    x: step as f32,
                    y: -(step as f32),
                };
                registry.add(e, pos);
                model.entry(e).or_default().0 = Some(pos);
            }
            4 if !alive.is_empty() => {
                let e = alive[rng.gen_range(0..alive.len())];
                registry.add(e, Health(step));
                model.entry(e).or_default().1 = Some(Health(step));
            }
            5 if !alive.is_empty() => {
                let e = alive[rng.gen_range(0..alive.len())];
                let expected = model.entry(e).or_default().0.take();
                assert_eq!(registry.remove::<Position>(e), expected);
            }
            _ => {}
        }
    }

    assert_eq!(registry.entity_count(), alive.len());
    for (&e, &(pos, health)) in &model {
        assert!(registry.is_alive(e));
        assert_eq!(registry.try_get::<Position>(e).ok().copied(), pos);
        assert_eq!(registry.try_get::<Health>(e).ok().copied(), health);
        assert_eq!(registry.has::<Position>(e), pos.is_some());
    }
}

#[test]
fn view_matches_brute_force_intersection() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let mut registry = Registry::new();
    let entities: Vec<Entity> = (0..2_000).map(|_| registry.create_entity()).collect();

    for &e in &entities {
        if rng.gen_bool(0.5) {
            registry.add(e, Position { x: 0.0, y: 0.0 });
        }
        if rng.gen_bool(0.3) {
            registry.add(e, Velocity { dx: 1.0, dy: 2.0 });
        }
        if rng.gen_bool(0.8) {
            registry.add(e, Health(1));
        }
    }
    let mut doomed = entities.clone();
    doomed.shuffle(&mut rng);
    for &e in &doomed[..300] {
        registry.destroy_entity(e);
    }

    let expected: HashSet<Entity> = entities
        .iter()
        .copied()
        .filter(|&e| {
            registry.has::<Position>(e) && registry.has::<Velocity>(e) && registry.has::<Health>(e)
        })
        .collect();

    let mut visited = Vec::new();
    registry.view3::<Health, Position, Velocity, _>(|e, _, pos, vel| {
        pos.x += vel.dx;
        pos.y += vel.dy;
        visited.push(e);
    });

    let unique: HashSet<Entity> = visited.iter().copied().collect();
    assert_eq!(unique.len(), visited.len(), "entity visited twice");
    assert_eq!(unique, expected);

    for e in expected {
        assert_eq!(*registry.get::<Position>(e), Position { x: 1.0, y: 2.0 });
    }
}

#[test]
fn repeated_attach_remove_leaks_nothing() {
    let mut registry = Registry::new();
    let e = registry.create_entity();
    let other = registry.create_entity();
    registry.add(other, Health(0));

    for i in 0..1_000 {
        registry.add(e, Health(i));
        assert_eq!(registry.get::<Health>(e).0, i);
        assert_eq!(registry.remove::<Health>(e), Some(Health(i)));
    }

    assert!(!registry.has::<Health>(e));
    assert_eq!(registry.storage::<Health>().map(SparseSet::size), Some(1));
    let group = registry.create_group::<(Health,)>();
    assert!(!registry.matches_group(e, &group));
    assert!(registry.matches_group(other, &group));
}

#[test]
fn bulk_value_mutation_keeps_views_consistent() {
    let mut registry = Registry::new();
    let entities: Vec<Entity> = (0..100).map(|_| registry.create_entity()).collect();
    for (i, &e) in entities.iter().enumerate() {
        registry.add(e, Health(0));
        if i % 4 == 0 {
            registry.add(e, Velocity { dx: 1.0, dy: 0.0 });
        }
    }
    registry.destroy_entity(entities[8]);

    let mut touched = 0;
    for (e, health) in registry.components_mut::<Health>() {
        assert!(entities.contains(&e));
        health.0 += 5;
        touched += 1;
    }
    assert_eq!(touched, 99);

    let mut visited = 0;
    registry.view2::<Health, Velocity, _>(|e, health, _| {
        assert_eq!(health.0, 5);
        assert_ne!(e, entities[8]);
        visited += 1;
    });
    assert_eq!(visited, 24);

    for &e in &entities[..8] {
        assert_eq!(registry.has::<Health>(e), registry.try_get::<Health>(e).is_ok());
    }
}

#[test]
fn recycled_slots_never_revive_stale_handles() {
    let mut registry = Registry::new();
    let mut stale = Vec::new();

    for round in 0..50u32 {
        let batch: Vec<Entity> = (0..100).map(|_| registry.create_entity()).collect();
        for &e in &batch {
            registry.add(e, Health(round));
        }
        for e in batch {
            assert!(registry.destroy_entity(e));
            stale.push(e);
        }
    }

    assert_eq!(registry.slot_count(), 100);
    assert_eq!(registry.entity_count(), 0);
    for e in stale {
        assert!(!registry.is_alive(e));
        assert!(!registry.has::<Health>(e));
        assert!(registry.try_get::<Health>(e).is_err());
    }

    let fresh = registry.create_entity();
    assert_eq!(fresh.generation(), 51);
}

// ============================================================================
// CONSUMER: LIFE GRID
// ============================================================================

const GRID_W: usize = 8;
const GRID_H: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Cell {
    x: usize,
    y: usize,
    alive: bool,
}

/// One generation of Conway's rules, driven through a view the way a
/// per-frame system would.
fn step_life(registry: &mut Registry) {
    let mut current = vec![false; GRID_W * GRID_H];
    registry.view::<Cell, _>(|_, cell| current[cell.x + cell.y * GRID_W] = cell.alive);

    registry.view::<Cell, _>(|_, cell| {
        let mut neighbours = 0;
        for dy in [GRID_H - 1, 0, 1] {
            for dx in [GRID_W - 1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (cell.x + dx) % GRID_W;
                let ny = (cell.y + dy) % GRID_H;
                neighbours += usize::from(current[nx + ny * GRID_W]);
            }
        }
        cell.alive = matches!((cell.alive, neighbours), (true, 2 | 3) | (false, 3));
    });
}

fn live_cells(registry: &mut Registry) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    registry.view::<Cell, _>(|_, cell| {
        if cell.alive {
            cells.push((cell.x, cell.y));
        }
    });
    cells.sort_unstable();
    cells
}

#[test]
fn life_blinker_oscillates() {
    let mut registry = Registry::new();
    for y in 0..GRID_H {
        for x in 0..GRID_W {
            let e = registry.create_entity();
            let alive = y == 3 && (2..=4).contains(&x);
            registry.add(e, Cell { x, y, alive });
        }
    }

    let horizontal = vec![(2, 3), (3, 3), (4, 3)];
    let vertical = vec![(3, 2), (3, 3), (3, 4)];

    assert_eq!(live_cells(&mut registry), horizontal);
    step_life(&mut registry);
    assert_eq!(live_cells(&mut registry), vertical);
    step_life(&mut registry);
    assert_eq!(live_cells(&mut registry), horizontal);
}
