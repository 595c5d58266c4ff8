//! Converts elapsed time into spendable spawn points.

use serde::{Deserialize, Serialize};

/// Accrual parameters for the spawn budget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetTuning {
    /// Points accrued per second before phase and level multipliers.
    pub base_rate: f64,
    /// Points available when a run starts.
    pub initial_points: f64,
}

impl Default for BudgetTuning {
    fn default() -> Self {
        Self {
            base_rate: 1.2,
            initial_points: 0.0,
        }
    }
}

/// Spawn point balance with running totals for auditing.
///
/// At all times `accrued() == spent() + points()` up to float rounding.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetAccumulator {
    points: f64,
    accrued: f64,
    spent: f64,
}

impl BudgetAccumulator {
    /// Creates a balance holding `initial_points`.
    #[must_use]
    pub fn new(initial_points: f64) -> Self {
        let initial_points = initial_points.max(0.0);
        Self {
            points: initial_points,
            accrued: initial_points,
            spent: 0.0,
        }
    }

    /// Adds `rate * dt` points. Negative inputs accrue nothing.
    pub fn accrue(&mut self, dt: f64, rate: f64) {
        let gained = (rate * dt).max(0.0);
        self.points += gained;
        self.accrued += gained;
    }

    /// Spends `cost` if the balance covers it; otherwise leaves it untouched.
    pub fn try_spend(&mut self, cost: f64) -> bool {
        if self.points < cost {
            return false;
        }
        self.points -= cost;
        self.spent += cost;
        true
    }

    /// Returns points from a purchase that could not be placed.
    pub fn refund(&mut self, cost: f64) {
        self.points += cost;
        self.spent -= cost;
    }

    /// Current balance.
    #[must_use]
    pub fn points(&self) -> f64 {
        self.points
    }

    /// Total points ever accrued, including the initial balance.
    #[must_use]
    pub fn accrued(&self) -> f64 {
        self.accrued
    }

    /// Total points spent on placed enemies.
    #[must_use]
    pub fn spent(&self) -> f64 {
        self.spent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn failed_purchase_keeps_balance() {
        let mut budget = BudgetAccumulator::new(0.0);
        budget.accrue(0.5, 1.2);
        assert!(!budget.try_spend(1.0));
        assert!((budget.points() - 0.6).abs() < EPSILON);

        budget.accrue(0.5, 1.2);
        assert!(budget.try_spend(1.0));
        assert!((budget.points() - 0.2).abs() < EPSILON);
    }

    #[test]
    fn accrual_is_independent_of_tick_granularity() {
        let rate = 1.7;
        let mut coarse = BudgetAccumulator::new(0.0);
        coarse.accrue(10.0, rate);

        let mut fine = BudgetAccumulator::new(0.0);
        let steps = [0.016, 0.5, 0.033, 2.0, 0.001, 3.45, 1.0, 2.0, 0.9];
        let total: f64 = steps.iter().sum();
        for dt in steps {
            fine.accrue(dt, rate);
            let _ = fine.try_spend(1.0);
        }

        assert!((coarse.accrued() - rate * 10.0).abs() < 1e-6);
        assert!((fine.accrued() - rate * total).abs() < 1e-6);
        assert!((fine.spent() + fine.points() - fine.accrued()).abs() < 1e-6);
    }

    #[test]
    fn refund_restores_balance_and_ledger() {
        let mut budget = BudgetAccumulator::new(3.0);
        assert!(budget.try_spend(2.5));
        budget.refund(2.5);
        assert!((budget.points() - 3.0).abs() < EPSILON);
        assert!(budget.spent().abs() < EPSILON);
    }

    #[test]
    fn negative_time_does_not_drain() {
        let mut budget = BudgetAccumulator::new(1.0);
        budget.accrue(-5.0, 2.0);
        assert!((budget.points() - 1.0).abs() < EPSILON);
    }
}
