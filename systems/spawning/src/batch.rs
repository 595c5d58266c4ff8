//! Paced queue that releases purchased spawns one at a time.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use survivor_core::SpawnRequest;

/// Pacing and spread of queued spawns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchTuning {
    /// Minimum seconds between two dispatched spawns.
    pub pacing: f64,
    /// Maximum offset, in world units, of batch members from the anchor.
    pub jitter: f32,
}

impl Default for BatchTuning {
    fn default() -> Self {
        Self {
            pacing: 0.04,
            jitter: 20.0,
        }
    }
}

/// Purchased spawn waiting for dispatch, with the cost paid for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedSpawn {
    /// Request handed to the factory once released.
    pub request: SpawnRequest,
    /// Points paid; refunded if the request is dropped.
    pub cost: f64,
}

/// Software rate limiter draining at most one request per pacing window.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnBatch {
    queue: VecDeque<QueuedSpawn>,
    pacing: f64,
    last_dispatch: Option<f64>,
}

impl SpawnBatch {
    /// Creates an empty batch with the provided pacing in seconds.
    #[must_use]
    pub fn new(pacing: f64) -> Self {
        Self {
            queue: VecDeque::new(),
            pacing: pacing.max(0.0),
            last_dispatch: None,
        }
    }

    /// Appends a purchased spawn.
    pub fn push(&mut self, spawn: QueuedSpawn) {
        self.queue.push_back(spawn);
    }

    /// Releases the head of the queue if the pacing window since the last
    /// release has elapsed at `now`.
    pub fn pop_ready(&mut self, now: f64) -> Option<QueuedSpawn> {
        if let Some(last) = self.last_dispatch {
            if now - last < self.pacing {
                return None;
            }
        }
        let spawn = self.queue.pop_front()?;
        self.last_dispatch = Some(now);
        Some(spawn)
    }

    /// Number of spawns waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::{EnemyKind, Position, StatScaling};

    fn queued(x: f32) -> QueuedSpawn {
        QueuedSpawn {
            request: SpawnRequest {
                kind: EnemyKind::Chaser,
                position: Position::new(x, 0.0),
                stats: StatScaling::IDENTITY,
            },
            cost: 1.0,
        }
    }

    #[test]
    fn first_release_is_immediate() {
        let mut batch = SpawnBatch::new(0.04);
        batch.push(queued(1.0));
        assert_eq!(batch.pop_ready(0.0), Some(queued(1.0)));
        assert!(batch.is_empty());
    }

    #[test]
    fn releases_respect_pacing_window() {
        let mut batch = SpawnBatch::new(0.1);
        batch.push(queued(1.0));
        batch.push(queued(2.0));
        batch.push(queued(3.0));

        assert_eq!(batch.pop_ready(1.0), Some(queued(1.0)));
        assert_eq!(batch.pop_ready(1.05), None);
        assert_eq!(batch.pop_ready(1.1), Some(queued(2.0)));
        assert_eq!(batch.pop_ready(1.1), None);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.pop_ready(5.0), Some(queued(3.0)));
        assert_eq!(batch.pop_ready(10.0), None);
    }

    #[test]
    fn empty_poll_does_not_consume_window() {
        let mut batch = SpawnBatch::new(0.5);
        assert_eq!(batch.pop_ready(0.0), None);
        batch.push(queued(4.0));
        assert_eq!(batch.pop_ready(0.1), Some(queued(4.0)));
    }
}
