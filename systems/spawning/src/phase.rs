//! Difficulty state machine: an alternating pressure/breather duty cycle with
//! a time-gated chaos window layered on top.
//!
//! Every completed breather escalates the cycle: both rate multipliers grow
//! and both durations shrink toward their floors, so difficulty never drops
//! from one cycle to the next.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Named state of the duty cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    /// High-pressure stretch with the full spawn rate.
    Pressure,
    /// Low-pressure recovery stretch.
    Breather,
}

/// Parameters of the pressure/breather duty cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleTuning {
    /// Disabled cycles leave the rate multiplier at one.
    pub enabled: bool,
    /// Seconds spent in the first pressure stretch.
    pub pressure_duration: f64,
    /// Seconds spent in the first breather stretch.
    pub breather_duration: f64,
    /// Rate multiplier applied during the first pressure stretch.
    pub pressure_rate_multiplier: f64,
    /// Rate multiplier applied during the first breather stretch.
    pub breather_rate_multiplier: f64,
    /// Growth of the pressure multiplier per completed cycle.
    pub pressure_rate_step: f64,
    /// Growth of the breather multiplier per completed cycle.
    pub breather_rate_step: f64,
    /// Seconds removed from the pressure stretch per completed cycle.
    pub pressure_duration_step: f64,
    /// Seconds removed from the breather stretch per completed cycle.
    pub breather_duration_step: f64,
    /// Shortest pressure stretch the cycle may shrink to.
    pub pressure_duration_floor: f64,
    /// Shortest breather stretch the cycle may shrink to.
    pub breather_duration_floor: f64,
}

impl Default for CycleTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            pressure_duration: 30.0,
            breather_duration: 10.0,
            pressure_rate_multiplier: 1.0,
            breather_rate_multiplier: 0.4,
            pressure_rate_step: 0.1,
            breather_rate_step: 0.05,
            pressure_duration_step: 2.0,
            breather_duration_step: 0.5,
            pressure_duration_floor: 2.0,
            breather_duration_floor: 1.5,
        }
    }
}

/// Parameters of the chaos window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosTuning {
    /// Disabled chaos never activates.
    pub enabled: bool,
    /// Elapsed seconds at which the first window may open.
    pub first_at: f64,
    /// Seconds each window stays open.
    pub duration: f64,
    /// Seconds between the end of one window and the start of the next.
    pub cooldown: f64,
    /// Multiplier applied to the accrual rate while open.
    pub spawn_multiplier: f64,
    /// Extra population allowed, per kind and globally, while open.
    pub cap_bonus: u32,
    /// Kinds costing at most this much get their weight boosted while open.
    pub cheap_cost_threshold: f64,
    /// Weight multiplier applied to cheap kinds while open.
    pub cheap_weight_multiplier: f64,
    /// Smallest batch purchased per selection while open.
    pub batch_min: u32,
    /// Largest batch purchased per selection while open.
    pub batch_max: u32,
}

impl Default for ChaosTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            first_at: 60.0,
            duration: 20.0,
            cooldown: 90.0,
            spawn_multiplier: 2.2,
            cap_bonus: 20,
            cheap_cost_threshold: 1.2,
            cheap_weight_multiplier: 3.0,
            batch_min: 2,
            batch_max: 3,
        }
    }
}

/// Aggregated phase tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTuning {
    /// Pressure/breather duty cycle.
    pub cycle: CycleTuning,
    /// Chaos overlay.
    pub chaos: ChaosTuning,
}

/// Read-only view of the phase machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseState {
    /// Current duty cycle state.
    pub name: PhaseName,
    /// Seconds left in the current duty cycle state.
    pub timer: f64,
    /// Number of completed pressure/breather cycles.
    pub cycle_index: u32,
    /// Combined multiplier applied to the base accrual rate.
    pub rate_multiplier: f64,
    /// Extra population allowed on top of every cap.
    pub cap_bonus: u32,
    /// Whether the chaos window is open.
    pub chaos_active: bool,
    /// Elapsed time at which the next chaos window may open.
    pub next_chaos_at: f64,
    /// Pressure multiplier for the current cycle.
    pub pressure_rate_multiplier: f64,
    /// Breather multiplier for the current cycle.
    pub breather_rate_multiplier: f64,
    /// Pressure stretch length for the current cycle.
    pub pressure_duration: f64,
    /// Breather stretch length for the current cycle.
    pub breather_duration: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ChaosWindow {
    active: bool,
    timer: f64,
    next_at: f64,
}

/// Drives the duty cycle and chaos window. Transitions only inside [`advance`].
///
/// [`advance`]: PhaseController::advance
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseController {
    cycle: CycleTuning,
    chaos_tuning: ChaosTuning,
    name: PhaseName,
    timer: f64,
    cycle_index: u32,
    pressure_rate: f64,
    breather_rate: f64,
    pressure_duration: f64,
    breather_duration: f64,
    chaos: ChaosWindow,
}

impl PhaseController {
    /// Creates a controller in the initial pressure state with chaos closed.
    #[must_use]
    pub fn new(tuning: PhaseTuning) -> Self {
        let cycle = tuning.cycle;
        Self {
            cycle,
            chaos_tuning: tuning.chaos,
            name: PhaseName::Pressure,
            timer: cycle.pressure_duration,
            cycle_index: 0,
            pressure_rate: cycle.pressure_rate_multiplier,
            breather_rate: cycle.breather_rate_multiplier,
            pressure_duration: cycle.pressure_duration,
            breather_duration: cycle.breather_duration,
            chaos: ChaosWindow {
                active: false,
                timer: 0.0,
                next_at: tuning.chaos.first_at,
            },
        }
    }

    /// Advances both machines by `dt`; `elapsed` is the run time after the step.
    pub fn advance(&mut self, dt: f64, elapsed: f64) {
        let dt = dt.max(0.0);
        self.advance_cycle(dt);
        self.advance_chaos(dt, elapsed);
    }

    fn advance_cycle(&mut self, dt: f64) {
        if !self.cycle.enabled {
            return;
        }

        self.timer -= dt;
        while self.timer <= 0.0 {
            match self.name {
                PhaseName::Pressure => {
                    self.name = PhaseName::Breather;
                    self.timer += self.breather_duration;
                }
                PhaseName::Breather => {
                    self.increase_cycle_difficulty();
                    self.name = PhaseName::Pressure;
                    self.timer += self.pressure_duration;
                }
            }
            debug!(
                phase = ?self.name,
                cycle = self.cycle_index,
                rate = self.cycle_rate(),
                "phase transition"
            );
        }
    }

    fn increase_cycle_difficulty(&mut self) {
        let cycle = &self.cycle;
        self.cycle_index = self.cycle_index.saturating_add(1);
        self.pressure_rate += cycle.pressure_rate_step;
        self.breather_rate += cycle.breather_rate_step;
        self.pressure_duration = (self.pressure_duration - cycle.pressure_duration_step)
            .max(cycle.pressure_duration_floor);
        self.breather_duration = (self.breather_duration - cycle.breather_duration_step)
            .max(cycle.breather_duration_floor);
    }

    fn advance_chaos(&mut self, dt: f64, elapsed: f64) {
        if !self.chaos_tuning.enabled {
            return;
        }

        if self.chaos.active {
            self.chaos.timer -= dt;
            if self.chaos.timer <= 0.0 {
                self.chaos.active = false;
                self.chaos.next_at = elapsed + self.chaos_tuning.cooldown;
                info!(elapsed, next_at = self.chaos.next_at, "chaos window closed");
            }
        }

        if !self.chaos.active && elapsed >= self.chaos.next_at {
            self.chaos.active = true;
            self.chaos.timer = self.chaos_tuning.duration;
            info!(elapsed, duration = self.chaos_tuning.duration, "chaos window opened");
        }
    }

    fn cycle_rate(&self) -> f64 {
        if !self.cycle.enabled {
            return 1.0;
        }
        match self.name {
            PhaseName::Pressure => self.pressure_rate,
            PhaseName::Breather => self.breather_rate,
        }
    }

    /// Combined multiplier applied to the base accrual rate.
    #[must_use]
    pub fn rate_multiplier(&self) -> f64 {
        match self.active_chaos() {
            Some(chaos) => self.cycle_rate() * chaos.spawn_multiplier,
            None => self.cycle_rate(),
        }
    }

    /// Extra population allowed on top of every cap.
    #[must_use]
    pub fn cap_bonus(&self) -> u32 {
        self.active_chaos().map_or(0, |chaos| chaos.cap_bonus)
    }

    /// Chaos tuning while a window is open.
    #[must_use]
    pub fn active_chaos(&self) -> Option<&ChaosTuning> {
        self.chaos.active.then_some(&self.chaos_tuning)
    }

    /// Current duty cycle state.
    #[must_use]
    pub fn name(&self) -> PhaseName {
        self.name
    }

    /// Snapshot of the machine.
    #[must_use]
    pub fn state(&self) -> PhaseState {
        PhaseState {
            name: self.name,
            timer: self.timer,
            cycle_index: self.cycle_index,
            rate_multiplier: self.rate_multiplier(),
            cap_bonus: self.cap_bonus(),
            chaos_active: self.chaos.active,
            next_chaos_at: self.chaos.next_at,
            pressure_rate_multiplier: self.pressure_rate,
            breather_rate_multiplier: self.breather_rate,
            pressure_duration: self.pressure_duration,
            breather_duration: self.breather_duration,
        }
    }
}
