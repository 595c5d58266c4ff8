//! Static table describing what each enemy kind costs and how many may live at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use survivor_core::EnemyKind;

use crate::config::ConfigError;

/// Immutable catalog entry for a single enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTypeConfig {
    /// Kind described by the entry.
    pub kind: EnemyKind,
    /// Spawn points required to purchase one enemy of this kind.
    pub cost: f64,
    /// Maximum number of simultaneously live enemies of this kind.
    pub population_cap: u32,
    /// Relative selection weight used by the weighted draw.
    pub weight: f64,
}

impl EnemyTypeConfig {
    /// Creates a new catalog entry.
    #[must_use]
    pub const fn new(kind: EnemyKind, cost: f64, population_cap: u32, weight: f64) -> Self {
        Self {
            kind,
            cost,
            population_cap,
            weight,
        }
    }
}

/// Reference balance shipped with the game.
#[must_use]
pub fn default_entries() -> Vec<EnemyTypeConfig> {
    vec![
        EnemyTypeConfig::new(EnemyKind::Chaser, 1.0, 18, 1.0),
        EnemyTypeConfig::new(EnemyKind::Wanderer, 1.2, 10, 1.0),
        EnemyTypeConfig::new(EnemyKind::Shooter, 1.5, 8, 1.0),
        EnemyTypeConfig::new(EnemyKind::Fast, 1.3, 12, 1.0),
        EnemyTypeConfig::new(EnemyKind::Tank, 2.5, 6, 1.0),
        EnemyTypeConfig::new(EnemyKind::Elite, 4.0, 3, 1.0),
    ]
}

/// Validated lookup table keyed by enemy kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyCatalog {
    entries: BTreeMap<EnemyKind, EnemyTypeConfig>,
}

impl EnemyCatalog {
    /// Builds the catalog, rejecting duplicates and non-sensical numbers.
    pub fn build(entries: &[EnemyTypeConfig]) -> Result<Self, ConfigError> {
        let mut table = BTreeMap::new();
        for entry in entries {
            if !(entry.cost.is_finite() && entry.cost > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "catalog.cost",
                    reason: format!("{} must cost a positive amount, got {}", entry.kind, entry.cost),
                });
            }
            if !(entry.weight.is_finite() && entry.weight >= 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "catalog.weight",
                    reason: format!(
                        "{} must have a non-negative weight, got {}",
                        entry.kind, entry.weight
                    ),
                });
            }
            if table.insert(entry.kind, *entry).is_some() {
                return Err(ConfigError::DuplicateEnemyType(entry.kind));
            }
        }
        Ok(Self { entries: table })
    }

    /// Returns the entry describing `kind`, if the catalog knows it.
    #[must_use]
    pub fn get(&self, kind: EnemyKind) -> Option<&EnemyTypeConfig> {
        self.entries.get(&kind)
    }

    /// Reports whether the catalog contains `kind`.
    #[must_use]
    pub fn contains(&self, kind: EnemyKind) -> bool {
        self.entries.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_covers_every_kind() {
        let catalog = EnemyCatalog::build(&default_entries()).expect("default catalog is valid");
        for kind in survivor_core::ALL_ENEMY_KINDS {
            assert!(catalog.contains(kind), "missing {kind}");
        }
        assert_eq!(catalog.get(EnemyKind::Tank).map(|entry| entry.population_cap), Some(6));
    }

    #[test]
    fn rejects_duplicate_kinds() {
        let entries = [
            EnemyTypeConfig::new(EnemyKind::Chaser, 1.0, 5, 1.0),
            EnemyTypeConfig::new(EnemyKind::Chaser, 2.0, 5, 1.0),
        ];
        assert!(matches!(
            EnemyCatalog::build(&entries),
            Err(ConfigError::DuplicateEnemyType(EnemyKind::Chaser))
        ));
    }

    #[test]
    fn rejects_free_enemies() {
        let entries = [EnemyTypeConfig::new(EnemyKind::Fast, 0.0, 5, 1.0)];
        assert!(matches!(
            EnemyCatalog::build(&entries),
            Err(ConfigError::InvalidValue { field: "catalog.cost", .. })
        ));
    }
}
