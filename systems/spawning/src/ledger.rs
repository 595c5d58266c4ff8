//! Live population bookkeeping, kept in sync by explicit register/release calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use survivor_core::EnemyKind;

/// Global population ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationTuning {
    /// Maximum number of simultaneously live enemies across all kinds.
    pub global_cap: u32,
}

impl Default for PopulationTuning {
    fn default() -> Self {
        Self { global_cap: 30 }
    }
}

/// Counts live enemies per kind. Holds counts only, never entity references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationLedger {
    live: BTreeMap<EnemyKind, u32>,
    total: u32,
}

impl PopulationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether one more `kind` fits under both caps.
    ///
    /// Both caps are expected to already include any phase bonus.
    #[must_use]
    pub fn can_spawn(&self, kind: EnemyKind, type_cap: u32, global_cap: u32) -> bool {
        self.count(kind) < type_cap && self.total < global_cap
    }

    /// Number of additional `kind` enemies that fit under both caps.
    #[must_use]
    pub fn remaining_capacity(&self, kind: EnemyKind, type_cap: u32, global_cap: u32) -> u32 {
        let per_type = type_cap.saturating_sub(self.count(kind));
        let global = global_cap.saturating_sub(self.total);
        per_type.min(global)
    }

    /// Records that an enemy of `kind` entered the world.
    pub fn register(&mut self, kind: EnemyKind) {
        *self.live.entry(kind).or_insert(0) += 1;
        self.total += 1;
    }

    /// Records that an enemy of `kind` left the world.
    ///
    /// Returns `false` when no such enemy was tracked; counts never underflow.
    pub fn release(&mut self, kind: EnemyKind) -> bool {
        let Some(count) = self.live.get_mut(&kind) else {
            return false;
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        if *count == 0 {
            let _ = self.live.remove(&kind);
        }
        self.total = self.total.saturating_sub(1);
        true
    }

    /// Live count for `kind`.
    #[must_use]
    pub fn count(&self, kind: EnemyKind) -> u32 {
        self.live.get(&kind).copied().unwrap_or(0)
    }

    /// Live count across every kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Live counts for every kind with at least one enemy alive.
    #[must_use]
    pub fn counts(&self) -> &BTreeMap<EnemyKind, u32> {
        &self.live
    }
}
