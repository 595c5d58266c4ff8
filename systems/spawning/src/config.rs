//! Aggregated tuning surface and its TOML loader.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use survivor_core::{EnemyKind, StatScaling, WorldBounds};
use thiserror::Error;

use crate::{
    batch::BatchTuning,
    budget::BudgetTuning,
    catalog::{self, EnemyCatalog, EnemyTypeConfig},
    ledger::PopulationTuning,
    phase::PhaseTuning,
    sampler::SamplerTuning,
    unlocks::{self, UnlockRule, UnlockThreshold},
};

/// Errors raised while loading or validating a [`DirectorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read director config from {path:?}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse director config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A kind is referenced somewhere but has no catalog entry.
    #[error("enemy type `{kind}` is referenced by {context} but missing from the catalog")]
    UnknownEnemyType {
        /// Kind without a catalog entry.
        kind: EnemyKind,
        /// Section of the configuration that referenced it.
        context: &'static str,
    },
    /// The catalog lists the same kind twice.
    #[error("enemy type `{0}` appears more than once in the catalog")]
    DuplicateEnemyType(EnemyKind),
    /// A numeric parameter is outside its meaningful range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted name of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

/// Optional growth of the accrual rate and global cap with player level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelScaling {
    /// Rate is multiplied by `1 + rate_per_level * level`.
    pub rate_per_level: f64,
    /// Global cap grows by `cap_per_level * level`.
    pub cap_per_level: u32,
}

/// Per-level growth of the stat multipliers attached to spawn requests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatTuning {
    /// Health multiplier growth per level.
    pub health_per_level: f32,
    /// Speed multiplier growth per level.
    pub speed_per_level: f32,
    /// Damage multiplier growth per level.
    pub damage_per_level: f32,
}

impl StatTuning {
    /// Multipliers for an enemy purchased while the player is at `level`.
    #[must_use]
    pub fn scaling_for(&self, level: u32) -> StatScaling {
        let level = level as f32;
        StatScaling {
            health: 1.0 + self.health_per_level * level,
            speed: 1.0 + self.speed_per_level * level,
            damage: 1.0 + self.damage_per_level * level,
        }
    }
}

impl Default for StatTuning {
    fn default() -> Self {
        Self {
            health_per_level: 0.05,
            speed_per_level: 0.03,
            damage_per_level: 0.04,
        }
    }
}

/// Every adjustable aspect of the spawn director.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Playable rectangle spawns must stay inside.
    pub world: WorldBounds,
    /// Cost, cap and weight of each kind.
    pub catalog: Vec<EnemyTypeConfig>,
    /// Kinds available from the first tick.
    pub initial_pool: Vec<EnemyKind>,
    /// Gates that add kinds to the pool over time.
    pub unlocks: Vec<UnlockRule>,
    /// Spawn point accrual.
    pub budget: BudgetTuning,
    /// Global population cap.
    pub population: PopulationTuning,
    /// Spawn ring geometry.
    pub sampler: SamplerTuning,
    /// Dispatch pacing and batch spread.
    pub batch: BatchTuning,
    /// Duty cycle and chaos window.
    pub phases: PhaseTuning,
    /// Level-driven rate and cap growth.
    pub level: LevelScaling,
    /// Level-driven enemy stat multipliers.
    pub stats: StatTuning,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            world: WorldBounds::default(),
            catalog: catalog::default_entries(),
            initial_pool: vec![EnemyKind::Chaser],
            unlocks: unlocks::default_rules(),
            budget: BudgetTuning::default(),
            population: PopulationTuning::default(),
            sampler: SamplerTuning::default(),
            batch: BatchTuning::default(),
            phases: PhaseTuning::default(),
            level: LevelScaling::default(),
            stats: StatTuning::default(),
        }
    }
}

impl DirectorConfig {
    /// Parses and validates a TOML document. Missing sections keep defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DirectorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Builds the validated catalog described by this configuration.
    pub fn build_catalog(&self) -> Result<EnemyCatalog, ConfigError> {
        EnemyCatalog::build(&self.catalog)
    }

    /// Checks every startup invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = self.build_catalog()?;

        for kind in &self.initial_pool {
            if !catalog.contains(*kind) {
                return Err(ConfigError::UnknownEnemyType {
                    kind: *kind,
                    context: "initial_pool",
                });
            }
        }
        for rule in &self.unlocks {
            if !catalog.contains(rule.kind) {
                return Err(ConfigError::UnknownEnemyType {
                    kind: rule.kind,
                    context: "unlocks",
                });
            }
            if let UnlockThreshold::Time(seconds) = rule.threshold {
                ensure_non_negative("unlocks.threshold.time", seconds)?;
            }
        }

        let (width, height) = (self.world.width(), self.world.height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "world",
                reason: format!(
                    "dimensions must be finite and positive, got {width}x{height}"
                ),
            });
        }

        ensure_non_negative("budget.base_rate", self.budget.base_rate)?;
        ensure_non_negative("budget.initial_points", self.budget.initial_points)?;

        let sampler = &self.sampler;
        ensure_non_negative("sampler.inner_radius", f64::from(sampler.inner_radius))?;
        ensure_non_negative("sampler.outer_radius", f64::from(sampler.outer_radius))?;
        if sampler.inner_radius > sampler.outer_radius {
            return Err(ConfigError::InvalidValue {
                field: "sampler",
                reason: format!(
                    "expected inner_radius <= outer_radius, got {}..{}",
                    sampler.inner_radius, sampler.outer_radius
                ),
            });
        }

        ensure_non_negative("batch.pacing", self.batch.pacing)?;
        ensure_non_negative("batch.jitter", f64::from(self.batch.jitter))?;

        let cycle = &self.phases.cycle;
        ensure_positive("phases.cycle.pressure_duration_floor", cycle.pressure_duration_floor)?;
        ensure_positive("phases.cycle.breather_duration_floor", cycle.breather_duration_floor)?;
        ensure_positive("phases.cycle.pressure_duration", cycle.pressure_duration)?;
        ensure_positive("phases.cycle.breather_duration", cycle.breather_duration)?;
        ensure_non_negative("phases.cycle.pressure_rate_multiplier", cycle.pressure_rate_multiplier)?;
        ensure_non_negative("phases.cycle.breather_rate_multiplier", cycle.breather_rate_multiplier)?;
        ensure_non_negative("phases.cycle.pressure_rate_step", cycle.pressure_rate_step)?;
        ensure_non_negative("phases.cycle.breather_rate_step", cycle.breather_rate_step)?;
        ensure_non_negative("phases.cycle.pressure_duration_step", cycle.pressure_duration_step)?;
        ensure_non_negative("phases.cycle.breather_duration_step", cycle.breather_duration_step)?;

        let chaos = &self.phases.chaos;
        ensure_non_negative("phases.chaos.first_at", chaos.first_at)?;
        ensure_positive("phases.chaos.duration", chaos.duration)?;
        ensure_non_negative("phases.chaos.cooldown", chaos.cooldown)?;
        ensure_non_negative("phases.chaos.spawn_multiplier", chaos.spawn_multiplier)?;
        ensure_non_negative("phases.chaos.cheap_weight_multiplier", chaos.cheap_weight_multiplier)?;
        if chaos.batch_min == 0 || chaos.batch_min > chaos.batch_max {
            return Err(ConfigError::InvalidValue {
                field: "phases.chaos.batch_min",
                reason: format!(
                    "expected 1 <= batch_min <= batch_max, got {}..{}",
                    chaos.batch_min, chaos.batch_max
                ),
            });
        }

        ensure_non_negative("level.rate_per_level", self.level.rate_per_level)?;
        Ok(())
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field,
        reason: format!("must be a finite non-negative number, got {value}"),
    })
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field,
        reason: format!("must be a finite positive number, got {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        DirectorConfig::default()
            .validate()
            .expect("defaults must validate");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = DirectorConfig::from_toml_str("").expect("empty toml is valid");
        assert_eq!(config, DirectorConfig::default());
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let config = DirectorConfig::from_toml_str(
            r#"
            initial_pool = ["chaser", "fast"]

            [budget]
            base_rate = 2.5

            [phases.chaos]
            enabled = false

            [[unlocks]]
            kind = "tank"
            threshold = { level = 5 }
            "#,
        )
        .expect("config parses");

        assert_eq!(config.initial_pool, vec![EnemyKind::Chaser, EnemyKind::Fast]);
        assert!((config.budget.base_rate - 2.5).abs() < f64::EPSILON);
        assert!((config.budget.initial_points).abs() < f64::EPSILON);
        assert!(!config.phases.chaos.enabled);
        assert!(config.phases.cycle.enabled);
        assert_eq!(config.unlocks, vec![UnlockRule::at_level(EnemyKind::Tank, 5)]);
    }

    #[test]
    fn unlock_for_uncatalogued_kind_is_rejected() {
        let mut config = DirectorConfig::default();
        config.catalog.retain(|entry| entry.kind != EnemyKind::Elite);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownEnemyType {
                kind: EnemyKind::Elite,
                context: "unlocks",
            })
        ));
    }

    #[test]
    fn inverted_ring_is_rejected() {
        let mut config = DirectorConfig::default();
        config.sampler.inner_radius = 900.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "sampler", .. })
        ));
    }

    #[test]
    fn infinite_ring_radius_is_rejected() {
        let result = DirectorConfig::from_toml_str("[sampler]\nouter_radius = inf\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "sampler.outer_radius",
                ..
            })
        ));

        let mut config = DirectorConfig::default();
        config.sampler.inner_radius = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "sampler.inner_radius",
                ..
            })
        ));
    }

    #[test]
    fn unbounded_world_is_rejected() {
        let mut config = DirectorConfig::default();
        config.world = WorldBounds::new(f32::INFINITY, 5_000.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "world", .. })
        ));
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let result = DirectorConfig::from_toml_str(r#"initial_pool = ["dragon"]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/director.toml");
        match DirectorConfig::from_file(path) {
            Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn stat_scaling_grows_linearly() {
        let scaling = StatTuning::default().scaling_for(10);
        assert!((scaling.health - 1.5).abs() < 1e-6);
        assert!((scaling.speed - 1.3).abs() < 1e-6);
        assert!((scaling.damage - 1.4).abs() < 1e-6);
    }
}
