#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn director deciding when, what, how many and where enemies appear.
//!
//! The director is a best-effort scheduler driven by a single [`SpawnDirector::tick`]
//! call per frame. Each tick advances the phase machine, fires unlock rules,
//! accrues spawn points, releases at most one paced spawn to the external
//! [`EnemyFactory`], and otherwise purchases the next spawn when budget, caps
//! and geometry allow. Every failure degrades to "no spawn this tick".

pub mod batch;
pub mod budget;
pub mod catalog;
pub mod config;
pub mod ledger;
pub mod phase;
pub mod rng;
pub mod sampler;
pub mod unlocks;

use std::{collections::BTreeMap, time::Duration};

use survivor_core::{
    EnemyFactory, EnemyHandle, EnemyKind, Event, Position, SpawnRequest, StatScaling, WorldBounds,
};
use tracing::{debug, trace};

pub use crate::{
    batch::{BatchTuning, QueuedSpawn, SpawnBatch},
    budget::{BudgetAccumulator, BudgetTuning},
    catalog::{EnemyCatalog, EnemyTypeConfig},
    config::{ConfigError, DirectorConfig, LevelScaling, StatTuning},
    ledger::{PopulationLedger, PopulationTuning},
    phase::{ChaosTuning, CycleTuning, PhaseController, PhaseName, PhaseState, PhaseTuning},
    rng::{SeededRng, SpawnRng},
    sampler::{PositionSampler, SamplerTuning},
    unlocks::{UnlockRule, UnlockThreshold, UnlockTracker},
};

/// Per-frame inputs read by the director.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickInput {
    /// Simulated time since the previous tick.
    pub dt: Duration,
    /// Player position at the end of the frame.
    pub player_position: Position,
    /// Player experience level.
    pub player_level: u32,
}

impl TickInput {
    /// Creates a new tick input.
    #[must_use]
    pub const fn new(dt: Duration, player_position: Position, player_level: u32) -> Self {
        Self {
            dt,
            player_position,
            player_level,
        }
    }
}

/// Reason a tick did not purchase a new spawn. Every reason is retried next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnSkip {
    /// No unlocked kind with free capacity is affordable yet.
    BudgetInsufficient,
    /// Sampling found no in-bounds position; the purchase was refunded.
    PositionUnavailable,
    /// Global cap, or every unlocked kind's cap, is reached.
    PopulationCapReached,
    /// The pool holds no catalogued kind with a positive selection weight.
    NoUnlockedTypes,
}

/// Spawn handed to the factory during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchedSpawn {
    /// Handle returned by the factory.
    pub handle: EnemyHandle,
    /// Request that produced the enemy.
    pub request: SpawnRequest,
}

/// Outcome of a single tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Kinds that joined the pool this tick.
    pub unlocked: Vec<EnemyKind>,
    /// Spawns released to the factory this tick.
    pub dispatched: Vec<DispatchedSpawn>,
    /// Spawns purchased and queued this tick.
    pub queued: u32,
    /// Why no purchase happened, if one was attempted and failed.
    pub skip: Option<SpawnSkip>,
}

/// Read-only summary of the director for HUD and debug consumers.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectorSnapshot {
    /// Seconds since the run started.
    pub elapsed: f64,
    /// Unspent spawn points.
    pub budget: f64,
    /// Current accrual rate in points per second.
    pub rate: f64,
    /// Phase machine state.
    pub phase: PhaseState,
    /// Unlocked kinds in kind order.
    pub pool: Vec<EnemyKind>,
    /// Live enemies per kind.
    pub live: BTreeMap<EnemyKind, u32>,
    /// Live enemies across every kind.
    pub total_live: u32,
    /// Purchased spawns awaiting dispatch.
    pub pending: usize,
}

#[derive(Debug)]
struct DirectorState {
    elapsed: f64,
    level: u32,
    budget: BudgetAccumulator,
    unlocks: UnlockTracker,
    ledger: PopulationLedger,
    phase: PhaseController,
    batch: SpawnBatch,
}

impl DirectorState {
    fn new(config: &DirectorConfig) -> Self {
        Self {
            elapsed: 0.0,
            level: 0,
            budget: BudgetAccumulator::new(config.budget.initial_points),
            unlocks: UnlockTracker::new(&config.initial_pool, &config.unlocks),
            ledger: PopulationLedger::new(),
            phase: PhaseController::new(config.phases),
            batch: SpawnBatch::new(config.batch.pacing),
        }
    }
}

struct Candidate {
    kind: EnemyKind,
    cost: f64,
    type_cap: u32,
}

/// Owns all spawn scheduling state; mutated only through its own methods.
#[derive(Debug)]
pub struct SpawnDirector<R = SeededRng> {
    config: DirectorConfig,
    catalog: EnemyCatalog,
    sampler: PositionSampler,
    bounds: WorldBounds,
    rng: R,
    state: DirectorState,
}

impl SpawnDirector<SeededRng> {
    /// Creates a director backed by the default generator seeded with `seed`.
    pub fn with_seed(config: DirectorConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, SeededRng::new(seed))
    }
}

impl<R: SpawnRng> SpawnDirector<R> {
    /// Validates `config` and creates a director in its initial state.
    pub fn new(config: DirectorConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.build_catalog()?;
        Ok(Self {
            sampler: PositionSampler::new(config.sampler),
            bounds: config.world,
            state: DirectorState::new(&config),
            catalog,
            config,
            rng,
        })
    }

    /// Runs one scheduling step, handing `factory` at most one spawn.
    pub fn tick<F>(&mut self, input: TickInput, factory: &mut F) -> TickReport
    where
        F: EnemyFactory + ?Sized,
    {
        let dt = input.dt.as_secs_f64();
        self.state.elapsed += dt;
        self.state.level = input.player_level;
        self.state.phase.advance(dt, self.state.elapsed);

        let mut report = TickReport {
            unlocked: self
                .state
                .unlocks
                .refresh(self.state.elapsed, input.player_level),
            ..TickReport::default()
        };

        let rate = self.effective_rate();
        self.state.budget.accrue(dt, rate);

        self.dispatch_ready(factory, &mut report);
        if !self.state.batch.is_empty() {
            return report;
        }

        match self.purchase(input.player_position) {
            Ok(queued) => {
                report.queued = queued;
                if report.dispatched.is_empty() {
                    self.dispatch_ready(factory, &mut report);
                }
            }
            Err(skip) => {
                trace!(?skip, elapsed = self.state.elapsed, "no spawn this tick");
                report.skip = Some(skip);
            }
        }
        report
    }

    /// Consumes world events, releasing population for destroyed enemies.
    pub fn handle_events(&mut self, events: &[Event]) {
        for event in events {
            if let Event::EnemyDestroyed { kind, .. } = event {
                self.on_entity_destroyed(*kind);
            }
        }
    }

    /// Destruction hook the entity registry must call for every removed enemy.
    pub fn on_entity_destroyed(&mut self, kind: EnemyKind) {
        if !self.state.ledger.release(kind) {
            debug!(%kind, "destruction reported for untracked enemy");
        }
    }

    /// Discards budget, pool, ledger, phase and pending batch. Live enemies
    /// are left to the external registry.
    pub fn reset(&mut self) {
        self.state = DirectorState::new(&self.config);
    }

    /// Replaces the rectangle spawns must stay inside.
    pub fn set_world_bounds(&mut self, bounds: WorldBounds) {
        self.bounds = bounds;
    }

    /// Live enemies across every kind.
    #[must_use]
    pub fn current_live_population(&self) -> u32 {
        self.state.ledger.total()
    }

    /// Live enemies per kind.
    #[must_use]
    pub fn live_count_by_type(&self) -> &BTreeMap<EnemyKind, u32> {
        self.state.ledger.counts()
    }

    /// Seconds since the run started.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.state.elapsed
    }

    /// Unspent spawn points.
    #[must_use]
    pub fn budget(&self) -> &BudgetAccumulator {
        &self.state.budget
    }

    /// Phase machine state.
    #[must_use]
    pub fn phase(&self) -> PhaseState {
        self.state.phase.state()
    }

    /// Kinds currently available for spawning.
    #[must_use]
    pub fn pool(&self) -> Vec<EnemyKind> {
        self.state.unlocks.pool().iter().copied().collect()
    }

    /// Purchased spawns awaiting dispatch.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.batch.len()
    }

    /// Catalog the director was built with.
    #[must_use]
    pub fn catalog(&self) -> &EnemyCatalog {
        &self.catalog
    }

    /// Random source driving selection and placement.
    #[must_use]
    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Accrual rate in points per second for the current phase and level.
    #[must_use]
    pub fn effective_rate(&self) -> f64 {
        let level_factor = 1.0 + self.config.level.rate_per_level * f64::from(self.state.level);
        self.config.budget.base_rate * self.state.phase.rate_multiplier() * level_factor
    }

    /// Global cap including level growth and the phase bonus.
    #[must_use]
    pub fn global_cap(&self) -> u32 {
        self.config
            .population
            .global_cap
            .saturating_add(self.config.level.cap_per_level.saturating_mul(self.state.level))
            .saturating_add(self.state.phase.cap_bonus())
    }

    /// Summary of the director for HUD and debug consumers.
    #[must_use]
    pub fn snapshot(&self) -> DirectorSnapshot {
        DirectorSnapshot {
            elapsed: self.state.elapsed,
            budget: self.state.budget.points(),
            rate: self.effective_rate(),
            phase: self.state.phase.state(),
            pool: self.pool(),
            live: self.state.ledger.counts().clone(),
            total_live: self.state.ledger.total(),
            pending: self.state.batch.len(),
        }
    }

    fn type_cap(&self, kind: EnemyKind) -> Option<u32> {
        let entry = self.catalog.get(kind)?;
        Some(entry.population_cap.saturating_add(self.state.phase.cap_bonus()))
    }

    fn dispatch_ready<F>(&mut self, factory: &mut F, report: &mut TickReport)
    where
        F: EnemyFactory + ?Sized,
    {
        let Some(queued) = self.state.batch.pop_ready(self.state.elapsed) else {
            return;
        };

        let kind = queued.request.kind;
        let global_cap = self.global_cap();
        let fits = self
            .type_cap(kind)
            .is_some_and(|type_cap| self.state.ledger.can_spawn(kind, type_cap, global_cap));
        if !fits {
            self.state.budget.refund(queued.cost);
            debug!(%kind, "dropped queued spawn; population cap shrank");
            return;
        }

        let handle = factory.request_spawn(&queued.request);
        self.state.ledger.register(kind);
        report.dispatched.push(DispatchedSpawn {
            handle,
            request: queued.request,
        });
    }

    fn purchase(&mut self, player: Position) -> Result<u32, SpawnSkip> {
        let global_cap = self.global_cap();
        if self.state.ledger.total() >= global_cap {
            return Err(SpawnSkip::PopulationCapReached);
        }

        let chaos = self.state.phase.active_chaos().copied();
        let points = self.state.budget.points();
        let mut candidates = Vec::new();
        let mut weights = Vec::new();
        let mut described = false;
        let mut has_capacity = false;

        for &kind in self.state.unlocks.pool() {
            let (Some(entry), Some(type_cap)) = (self.catalog.get(kind), self.type_cap(kind))
            else {
                continue;
            };
            if entry.weight <= 0.0 {
                continue;
            }
            described = true;
            if !self.state.ledger.can_spawn(kind, type_cap, global_cap) {
                continue;
            }
            has_capacity = true;
            if points < entry.cost {
                continue;
            }

            let mut weight = entry.weight;
            if let Some(chaos) = &chaos {
                if entry.cost <= chaos.cheap_cost_threshold {
                    weight *= chaos.cheap_weight_multiplier;
                }
            }
            candidates.push(Candidate {
                kind,
                cost: entry.cost,
                type_cap,
            });
            weights.push(weight);
        }

        if !described {
            return Err(SpawnSkip::NoUnlockedTypes);
        }
        if !has_capacity {
            return Err(SpawnSkip::PopulationCapReached);
        }
        let Some(index) = self.rng.weighted_choice(&weights) else {
            return Err(SpawnSkip::BudgetInsufficient);
        };
        let Candidate {
            kind,
            cost,
            type_cap,
        } = candidates.swap_remove(index);

        if !self.state.budget.try_spend(cost) {
            return Err(SpawnSkip::BudgetInsufficient);
        }
        let Some(anchor) = self.sampler.sample(player, self.bounds, &mut self.rng) else {
            self.state.budget.refund(cost);
            return Err(SpawnSkip::PositionUnavailable);
        };

        let stats = self.config.stats.scaling_for(self.state.level);
        let wanted = match &chaos {
            Some(chaos) => self.rng.uniform_u32(chaos.batch_min..=chaos.batch_max),
            None => 1,
        };
        let capacity = self
            .state
            .ledger
            .remaining_capacity(kind, type_cap, global_cap);
        let size = wanted.min(capacity).max(1);

        self.enqueue(kind, anchor, stats, cost);
        let mut queued = 1;
        let jitter = self.config.batch.jitter;
        while queued < size && self.state.budget.try_spend(cost) {
            let dx = self.rng.uniform_f32(-jitter..=jitter);
            let dy = self.rng.uniform_f32(-jitter..=jitter);
            let position = self.bounds.clamp(anchor.offset(dx, dy));
            self.enqueue(kind, position, stats, cost);
            queued += 1;
        }

        trace!(%kind, queued, budget = self.state.budget.points(), "spawn purchased");
        Ok(queued)
    }

    fn enqueue(&mut self, kind: EnemyKind, position: Position, stats: StatScaling, cost: f64) {
        self.state.batch.push(QueuedSpawn {
            request: SpawnRequest {
                kind,
                position,
                stats,
            },
            cost,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingFactory {
        requests: Vec<SpawnRequest>,
    }

    impl EnemyFactory for RecordingFactory {
        fn request_spawn(&mut self, request: &SpawnRequest) -> EnemyHandle {
            self.requests.push(*request);
            EnemyHandle::new(self.requests.len() as u32 - 1)
        }
    }

    fn quiet_config() -> DirectorConfig {
        let mut config = DirectorConfig::default();
        config.phases.cycle.enabled = false;
        config.phases.chaos.enabled = false;
        config
    }

    fn input(dt_ms: u64) -> TickInput {
        TickInput::new(
            Duration::from_millis(dt_ms),
            Position::new(2_500.0, 2_500.0),
            1,
        )
    }

    #[test]
    fn skips_while_budget_is_short() {
        let mut director = SpawnDirector::with_seed(quiet_config(), 1).expect("valid config");
        let mut factory = RecordingFactory::default();

        let report = director.tick(input(500), &mut factory);

        assert_eq!(report.skip, Some(SpawnSkip::BudgetInsufficient));
        assert!(factory.requests.is_empty());
    }

    #[test]
    fn empty_pool_reports_no_unlocked_types() {
        let mut config = quiet_config();
        config.initial_pool.clear();
        config.unlocks.clear();
        let mut director = SpawnDirector::with_seed(config, 1).expect("valid config");
        let mut factory = RecordingFactory::default();

        let report = director.tick(input(5_000), &mut factory);
        assert_eq!(report.skip, Some(SpawnSkip::NoUnlockedTypes));
    }

    #[test]
    fn zero_weight_pool_reports_no_unlocked_types() {
        let mut config = quiet_config();
        for entry in &mut config.catalog {
            entry.weight = 0.0;
        }
        let mut director = SpawnDirector::with_seed(config, 1).expect("valid config");
        let mut factory = RecordingFactory::default();

        let report = director.tick(input(5_000), &mut factory);

        assert_eq!(report.skip, Some(SpawnSkip::NoUnlockedTypes));
        assert!((director.budget().points() - 6.0).abs() < 1e-9);
        assert!(factory.requests.is_empty());
    }

    #[test]
    fn zero_weight_kind_does_not_mask_capacity_of_others() {
        let mut config = quiet_config();
        config.initial_pool = vec![EnemyKind::Chaser, EnemyKind::Tank];
        config.unlocks.clear();
        for entry in &mut config.catalog {
            if entry.kind == EnemyKind::Tank {
                entry.weight = 0.0;
            }
        }
        let mut director = SpawnDirector::with_seed(config, 1).expect("valid config");
        let mut factory = RecordingFactory::default();

        let report = director.tick(input(500), &mut factory);
        assert_eq!(report.skip, Some(SpawnSkip::BudgetInsufficient));

        for _ in 0..20 {
            let _ = director.tick(input(1_000), &mut factory);
        }
        assert!(factory
            .requests
            .iter()
            .all(|request| request.kind == EnemyKind::Chaser));
    }

    #[test]
    fn zero_pacing_still_dispatches_one_spawn_per_tick() {
        let mut config = quiet_config();
        config.phases.chaos.enabled = true;
        config.phases.chaos.first_at = 0.0;
        config.batch.pacing = 0.0;
        config.budget.initial_points = 50.0;
        config.population.global_cap = 1_000;
        let mut director = SpawnDirector::with_seed(config, 6).expect("valid config");
        let mut factory = RecordingFactory::default();

        for _ in 0..60 {
            let report = director.tick(input(10), &mut factory);
            assert!(report.dispatched.len() <= 1, "{report:?}");
        }
        assert!(factory.requests.len() > 10);
    }

    #[test]
    fn failed_sampling_refunds_purchase() {
        let mut config = quiet_config();
        config.world = WorldBounds::new(100.0, 100.0);
        let mut director = SpawnDirector::with_seed(config, 9).expect("valid config");
        let mut factory = RecordingFactory::default();

        let report = director.tick(
            TickInput::new(Duration::from_secs(1), Position::new(50.0, 50.0), 1),
            &mut factory,
        );

        assert_eq!(report.skip, Some(SpawnSkip::PositionUnavailable));
        assert!((director.budget().points() - 1.2).abs() < 1e-9);
        assert!(director.budget().spent().abs() < 1e-9);
    }

    #[test]
    fn reset_discards_state_but_keeps_configuration() {
        let mut director = SpawnDirector::with_seed(quiet_config(), 4).expect("valid config");
        let mut factory = RecordingFactory::default();
        for _ in 0..200 {
            let _ = director.tick(input(1_000), &mut factory);
        }
        assert!(director.current_live_population() > 0);
        assert!(director.pool().len() > 1);

        director.reset();

        let snapshot = director.snapshot();
        assert_eq!(snapshot.elapsed, 0.0);
        assert_eq!(snapshot.total_live, 0);
        assert_eq!(snapshot.pool, vec![EnemyKind::Chaser]);
        assert_eq!(snapshot.pending, 0);
        assert_eq!(snapshot.phase.name, PhaseName::Pressure);
    }

    #[test]
    fn level_scaling_raises_rate_cap_and_stats() {
        let mut config = quiet_config();
        config.level = LevelScaling {
            rate_per_level: 0.1,
            cap_per_level: 2,
        };
        let mut director = SpawnDirector::with_seed(config, 2).expect("valid config");
        let mut factory = RecordingFactory::default();

        let report = director.tick(
            TickInput::new(Duration::from_secs(1), Position::new(2_500.0, 2_500.0), 10),
            &mut factory,
        );

        assert!((director.effective_rate() - 1.2 * 2.0).abs() < 1e-9);
        assert_eq!(director.global_cap(), 30 + 20);
        let dispatched = report.dispatched.first().expect("one spawn");
        assert!((dispatched.request.stats.health - 1.5).abs() < 1e-6);
    }
}
