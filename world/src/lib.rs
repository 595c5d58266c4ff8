#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative enemy registry and player state for the survivor arena.
//!
//! The world is the source of truth for which enemies are alive. It acts as
//! the spawn director's [`EnemyFactory`] and announces every removal through
//! [`Event::EnemyDestroyed`] so population bookkeeping stays accurate.

use std::time::Duration;

use survivor_core::{
    Command, EnemyFactory, EnemyHandle, EnemyKind, Event, Position, SpawnRequest, StatScaling,
    WorldBounds,
};

const STARTING_LEVEL: u32 = 1;

/// Live enemy tracked by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    handle: EnemyHandle,
    kind: EnemyKind,
    position: Position,
    stats: StatScaling,
}

impl Enemy {
    /// Handle that identifies the enemy.
    #[must_use]
    pub const fn handle(&self) -> EnemyHandle {
        self.handle
    }

    /// Kind of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Position at which the enemy currently stands.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Stat multipliers applied when the enemy was created.
    #[must_use]
    pub const fn stats(&self) -> StatScaling {
        self.stats
    }
}

#[derive(Debug)]
struct Player {
    position: Position,
    level: u32,
}

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    bounds: WorldBounds,
    player: Player,
    enemies: Vec<Enemy>,
    next_handle: u32,
    elapsed: Duration,
}

impl World {
    /// Creates a world with default bounds and the player at its centre.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bounds(WorldBounds::default())
    }

    /// Creates a world with the provided bounds and the player at its centre.
    #[must_use]
    pub fn with_bounds(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            player: Player {
                position: bounds.center(),
                level: STARTING_LEVEL,
            },
            enemies: Vec::new(),
            next_handle: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn spawn(&mut self, request: &SpawnRequest) -> EnemyHandle {
        let handle = EnemyHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.enemies.push(Enemy {
            handle,
            kind: request.kind,
            position: request.position,
            stats: request.stats,
        });
        handle
    }

    fn destroy(&mut self, handle: EnemyHandle) -> Option<Enemy> {
        let index = self
            .enemies
            .iter()
            .position(|enemy| enemy.handle == handle)?;
        Some(self.enemies.remove(index))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyFactory for World {
    fn request_spawn(&mut self, request: &SpawnRequest) -> EnemyHandle {
        self.spawn(request)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureWorld { bounds } => {
            world.bounds = bounds;
            world.player.position = bounds.clamp(world.player.position);
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { position } => {
            world.player.position = world.bounds.clamp(position);
        }
        Command::SetPlayerLevel { level } => {
            if world.player.level != level {
                world.player.level = level;
                out_events.push(Event::PlayerLevelChanged { level });
            }
        }
        Command::SpawnEnemy { request } => {
            let handle = world.spawn(&request);
            out_events.push(Event::EnemySpawned {
                handle,
                kind: request.kind,
                position: request.position,
            });
        }
        Command::DestroyEnemy { handle } => {
            if let Some(enemy) = world.destroy(handle) {
                out_events.push(Event::EnemyDestroyed {
                    handle,
                    kind: enemy.kind,
                });
            }
        }
        Command::ClearEnemies => {
            for enemy in world.enemies.drain(..) {
                out_events.push(Event::EnemyDestroyed {
                    handle: enemy.handle,
                    kind: enemy.kind,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{collections::BTreeMap, time::Duration};

    use super::{Enemy, World};
    use survivor_core::{EnemyHandle, EnemyKind, Position, WorldBounds};

    /// Playable rectangle of the world.
    #[must_use]
    pub fn bounds(world: &World) -> WorldBounds {
        world.bounds
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.player.position
    }

    /// Current player level.
    #[must_use]
    pub fn player_level(world: &World) -> u32 {
        world.player.level
    }

    /// Total simulated time the world has advanced through.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Live enemies ordered by creation.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Handles of every live enemy ordered by creation.
    #[must_use]
    pub fn enemy_handles(world: &World) -> Vec<EnemyHandle> {
        world.enemies.iter().map(Enemy::handle).collect()
    }

    /// Number of enemies currently alive.
    #[must_use]
    pub fn live_population(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of enemies currently alive, grouped by kind.
    #[must_use]
    pub fn live_count_by_type(world: &World) -> BTreeMap<EnemyKind, u32> {
        let mut counts = BTreeMap::new();
        for enemy in &world.enemies {
            *counts.entry(enemy.kind).or_insert(0) += 1;
        }
        counts
    }
}
