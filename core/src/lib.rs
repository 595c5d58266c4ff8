#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the survivor spawn director.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative enemy registry, and the spawn director. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to. The director itself never constructs enemies; it
//! hands [`SpawnRequest`] values to an [`EnemyFactory`] and learns about
//! destroyed enemies through [`Event::EnemyDestroyed`].

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Every enemy kind known to the game, in catalog order.
pub const ALL_ENEMY_KINDS: [EnemyKind; 6] = [
    EnemyKind::Chaser,
    EnemyKind::Wanderer,
    EnemyKind::Shooter,
    EnemyKind::Fast,
    EnemyKind::Tank,
    EnemyKind::Elite,
];

/// Enumerates the enemy archetypes the director may spawn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Melee enemy that runs straight at the player.
    Chaser,
    /// Enemy that drifts around before committing to an attack.
    Wanderer,
    /// Ranged enemy that keeps its distance and fires projectiles.
    Shooter,
    /// Fragile enemy with high movement speed.
    Fast,
    /// Slow, durable enemy that soaks damage.
    Tank,
    /// Rare, expensive enemy with boosted stats.
    Elite,
}

impl EnemyKind {
    /// Stable lowercase identifier used in configuration files and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Chaser => "chaser",
            EnemyKind::Wanderer => "wanderer",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Elite => "elite",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle identifying a live enemy inside the external registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyHandle(u32);

impl EnemyHandle {
    /// Creates a new handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Point in world space measured in world units (pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position translated by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned playable rectangle spanning `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    width: f32,
    height: f32,
}

impl WorldBounds {
    /// Creates bounds with the provided dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Total width of the world.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Total height of the world.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre of the world rectangle.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.width * 0.5, self.height * 0.5)
    }

    /// Reports whether the position lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (0.0..=self.width).contains(&position.x()) && (0.0..=self.height).contains(&position.y())
    }

    /// Projects the position onto the nearest point inside the rectangle.
    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x().clamp(0.0, self.width.max(0.0)),
            position.y().clamp(0.0, self.height.max(0.0)),
        )
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(5_000.0, 5_000.0)
    }
}

/// Level-derived stat multipliers the factory may apply to a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatScaling {
    /// Multiplier applied to the enemy's base health.
    pub health: f32,
    /// Multiplier applied to the enemy's base movement speed.
    pub speed: f32,
    /// Multiplier applied to the enemy's base damage.
    pub damage: f32,
}

impl StatScaling {
    /// Scaling that leaves every base stat unchanged.
    pub const IDENTITY: Self = Self {
        health: 1.0,
        speed: 1.0,
        damage: 1.0,
    };
}

impl Default for StatScaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transient instruction handed to the enemy factory; never retained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Kind of enemy to create.
    pub kind: EnemyKind,
    /// World position at which the enemy should appear.
    pub position: Position,
    /// Stat multipliers derived from the player's level at purchase time.
    pub stats: StatScaling,
}

/// External entry point that instantiates enemies on behalf of the director.
///
/// Implementors own the lifecycle of the created entity and must report its
/// destruction back to the director, either directly or by broadcasting
/// [`Event::EnemyDestroyed`].
pub trait EnemyFactory {
    /// Creates the requested enemy and returns the handle assigned to it.
    fn request_spawn(&mut self, request: &SpawnRequest) -> EnemyHandle;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the playable world rectangle.
    ConfigureWorld {
        /// New bounds of the world.
        bounds: WorldBounds,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Moves the player to the provided position, clamped to the world.
    MovePlayer {
        /// Desired player position.
        position: Position,
    },
    /// Updates the player's experience level.
    SetPlayerLevel {
        /// New level reached by the player.
        level: u32,
    },
    /// Requests that an enemy be created.
    SpawnEnemy {
        /// Description of the enemy to create.
        request: SpawnRequest,
    },
    /// Requests that a live enemy be removed from the world.
    DestroyEnemy {
        /// Handle of the enemy to remove.
        handle: EnemyHandle,
    },
    /// Removes every live enemy, e.g. when a match restarts.
    ClearEnemies,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the player's level changed.
    PlayerLevelChanged {
        /// Level the player reached.
        level: u32,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Handle assigned to the enemy.
        handle: EnemyHandle,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Position at which the enemy appeared.
        position: Position,
    },
    /// Confirms that an enemy left the world; drives population bookkeeping.
    EnemyDestroyed {
        /// Handle of the destroyed enemy.
        handle: EnemyHandle,
        /// Kind of the destroyed enemy.
        kind: EnemyKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_edges() {
        let bounds = WorldBounds::new(100.0, 50.0);
        assert!(bounds.contains(Position::new(0.0, 0.0)));
        assert!(bounds.contains(Position::new(100.0, 50.0)));
        assert!(!bounds.contains(Position::new(100.5, 10.0)));
        assert!(!bounds.contains(Position::new(10.0, -0.1)));
    }

    #[test]
    fn clamp_projects_outside_points_onto_edges() {
        let bounds = WorldBounds::new(100.0, 50.0);
        let clamped = bounds.clamp(Position::new(-12.0, 80.0));
        assert_eq!(clamped, Position::new(0.0, 50.0));
    }

    #[test]
    fn enemy_kind_uses_lowercase_identifiers() {
        let names: Vec<_> = ALL_ENEMY_KINDS.iter().map(|kind| kind.to_string()).collect();
        assert_eq!(
            names,
            ["chaser", "wanderer", "shooter", "fast", "tank", "elite"]
        );
    }
}
