//! Rejection sampling of spawn coordinates in a ring around the player.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use survivor_core::{Position, WorldBounds};

use crate::rng::SpawnRng;

/// Geometry of the spawn ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerTuning {
    /// Minimum distance from the player; keeps spawns off-screen.
    pub inner_radius: f32,
    /// Maximum distance from the player.
    pub outer_radius: f32,
    /// Draws attempted before giving up on this spawn opportunity.
    pub max_attempts: u32,
}

impl Default for SamplerTuning {
    fn default() -> Self {
        Self {
            inner_radius: 450.0,
            outer_radius: 800.0,
            max_attempts: 25,
        }
    }
}

/// Produces in-bounds positions at a bounded distance from the player.
#[derive(Clone, Copy, Debug)]
pub struct PositionSampler {
    tuning: SamplerTuning,
}

impl PositionSampler {
    /// Creates a sampler using the provided ring geometry.
    #[must_use]
    pub const fn new(tuning: SamplerTuning) -> Self {
        Self { tuning }
    }

    /// Draws up to `max_attempts` candidates and returns the first that lies
    /// inside `bounds`, or `None` when every attempt falls outside.
    pub fn sample<R>(&self, player: Position, bounds: WorldBounds, rng: &mut R) -> Option<Position>
    where
        R: SpawnRng + ?Sized,
    {
        let SamplerTuning {
            inner_radius,
            outer_radius,
            max_attempts,
        } = self.tuning;

        for _ in 0..max_attempts {
            let angle = rng.uniform_f32(0.0..=TAU);
            let distance = rng.uniform_f32(inner_radius..=outer_radius);
            let candidate = player.offset(angle.cos() * distance, angle.sin() * distance);
            if bounds.contains(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}
