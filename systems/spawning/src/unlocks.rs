//! One-way gates that grow the spawnable pool as the run progresses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use survivor_core::EnemyKind;
use tracing::info;

/// Condition that fires an unlock rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockThreshold {
    /// Fires once the run has lasted at least this many seconds.
    Time(f64),
    /// Fires once the player has reached at least this level.
    Level(u32),
}

impl UnlockThreshold {
    fn is_met(self, elapsed: f64, level: u32) -> bool {
        match self {
            UnlockThreshold::Time(seconds) => elapsed >= seconds,
            UnlockThreshold::Level(required) => level >= required,
        }
    }
}

/// Adds `kind` to the pool once `threshold` is met.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnlockRule {
    /// Enemy kind made available by the rule.
    pub kind: EnemyKind,
    /// Condition that fires the rule.
    pub threshold: UnlockThreshold,
}

impl UnlockRule {
    /// Rule that fires after `seconds` of elapsed time.
    #[must_use]
    pub const fn at_time(kind: EnemyKind, seconds: f64) -> Self {
        Self {
            kind,
            threshold: UnlockThreshold::Time(seconds),
        }
    }

    /// Rule that fires when the player reaches `level`.
    #[must_use]
    pub const fn at_level(kind: EnemyKind, level: u32) -> Self {
        Self {
            kind,
            threshold: UnlockThreshold::Level(level),
        }
    }
}

/// Reference progression: a new kind every few minutes.
#[must_use]
pub fn default_rules() -> Vec<UnlockRule> {
    vec![
        UnlockRule::at_time(EnemyKind::Wanderer, 60.0),
        UnlockRule::at_time(EnemyKind::Shooter, 120.0),
        UnlockRule::at_time(EnemyKind::Fast, 240.0),
        UnlockRule::at_time(EnemyKind::Tank, 360.0),
        UnlockRule::at_time(EnemyKind::Elite, 480.0),
    ]
}

/// Monotonic registry of the kinds currently available for spawning.
#[derive(Clone, Debug)]
pub struct UnlockTracker {
    rules: Vec<UnlockRule>,
    applied: Vec<bool>,
    pool: BTreeSet<EnemyKind>,
}

impl UnlockTracker {
    /// Creates a tracker whose pool starts with `initial`.
    #[must_use]
    pub fn new(initial: &[EnemyKind], rules: &[UnlockRule]) -> Self {
        Self {
            rules: rules.to_vec(),
            applied: vec![false; rules.len()],
            pool: initial.iter().copied().collect(),
        }
    }

    /// Fires every pending rule whose threshold is met and returns the kinds
    /// that joined the pool during this call.
    pub fn refresh(&mut self, elapsed: f64, level: u32) -> Vec<EnemyKind> {
        let mut unlocked = Vec::new();
        for (rule, applied) in self.rules.iter().zip(self.applied.iter_mut()) {
            if *applied || !rule.threshold.is_met(elapsed, level) {
                continue;
            }
            *applied = true;
            if self.pool.insert(rule.kind) {
                info!(kind = %rule.kind, elapsed, level, "enemy type unlocked");
                unlocked.push(rule.kind);
            }
        }
        unlocked
    }

    /// Kinds currently available, in kind order.
    #[must_use]
    pub fn pool(&self) -> &BTreeSet<EnemyKind> {
        &self.pool
    }

    /// Reports whether `kind` is available.
    #[must_use]
    pub fn is_unlocked(&self, kind: EnemyKind) -> bool {
        self.pool.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_rules_fire_at_threshold() {
        let mut tracker = UnlockTracker::new(&[EnemyKind::Chaser], &default_rules());

        assert!(tracker.refresh(59.9, 1).is_empty());
        assert_eq!(tracker.refresh(60.0, 1), vec![EnemyKind::Wanderer]);
        assert!(tracker.refresh(60.0, 1).is_empty(), "refresh is idempotent");
        assert!(tracker.is_unlocked(EnemyKind::Wanderer));
        assert!(!tracker.is_unlocked(EnemyKind::Shooter));
    }

    #[test]
    fn level_rules_ignore_elapsed_time() {
        let rules = [
            UnlockRule::at_level(EnemyKind::Fast, 3),
            UnlockRule::at_level(EnemyKind::Tank, 5),
        ];
        let mut tracker = UnlockTracker::new(&[EnemyKind::Chaser], &rules);

        assert!(tracker.refresh(10_000.0, 2).is_empty());
        assert_eq!(tracker.refresh(0.0, 5), vec![EnemyKind::Fast, EnemyKind::Tank]);
    }

    #[test]
    fn pool_never_shrinks() {
        let mut tracker = UnlockTracker::new(&[EnemyKind::Chaser], &default_rules());
        let mut previous = tracker.pool().clone();
        for step in 0..600 {
            let _ = tracker.refresh(f64::from(step), 1);
            assert!(tracker.pool().is_superset(&previous));
            previous = tracker.pool().clone();
        }
        assert_eq!(previous.len(), 6);
    }

    #[test]
    fn rule_for_initial_kind_reports_nothing() {
        let rules = [UnlockRule::at_time(EnemyKind::Chaser, 0.0)];
        let mut tracker = UnlockTracker::new(&[EnemyKind::Chaser], &rules);
        assert!(tracker.refresh(1.0, 1).is_empty());
        assert_eq!(tracker.pool().len(), 1);
    }
}
