#![deny(warnings)]

//! Economic models for Grid Tycoon: bonuses, resource aging and turn accounting.
//!
//! This crate provides:
//! - Special-effect aggregation and its application to turns and instances
//! - The per-instance lifecycle state machine
//! - Power, upkeep and profit arithmetic for a single turn
//! - The mutable economy owned by a running simulation

pub mod bonus;
pub mod lifecycle;

pub use bonus::{aggregate_bonuses, apply_percent, BonusSet};
pub use lifecycle::{lifecycle_state, LifecycleEngine, LifecycleState};

use serde::{Deserialize, Serialize};
use sim_core::{ActiveResource, Money, Power, ResourceDefinition, TurnSpec};

/// Buildings powered by instances currently operating.
pub fn operating_power(active: &[ActiveResource]) -> Power {
    active.iter().map(ActiveResource::current_power).sum()
}

/// Upkeep due this turn; instances in maintenance are not charged.
pub fn operating_upkeep(active: &[ActiveResource]) -> Money {
    active.iter().map(ActiveResource::current_upkeep).sum()
}

/// Upkeep of the whole active set regardless of duty state.
pub fn committed_upkeep(active: &[ActiveResource]) -> Money {
    active.iter().map(|r| r.definition.upkeep_cost).sum()
}

/// Available power clamped to the turn's maximum demand.
pub fn powered_buildings(power: Power, turn: &TurnSpec) -> Power {
    power.min(turn.maximum_demand)
}

/// Profit for `powered` buildings; nothing unless minimum demand is met.
pub fn turn_profit(powered: Power, turn: &TurnSpec) -> Money {
    if powered >= turn.minimum_demand {
        powered.saturating_mul(turn.profit_rate)
    } else {
        0
    }
}

/// Banked surplus power. Never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatorReserve {
    stored: Power,
}

impl AccumulatorReserve {
    pub fn stored(&self) -> Power {
        self.stored
    }

    /// Add surplus power; non-positive amounts are ignored.
    pub fn bank(&mut self, surplus: Power) {
        if surplus > 0 {
            self.stored = self.stored.saturating_add(surplus);
        }
    }

    /// Withdraw up to `deficit`, returning the amount actually drawn.
    pub fn draw(&mut self, deficit: Power) -> Power {
        let drawn = deficit.clamp(0, self.stored);
        self.stored -= drawn;
        drawn
    }
}

/// Mutable economy of a running simulation.
///
/// Owns the budget, the active resources in purchase order, and the
/// accumulator reserve.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyState {
    pub budget: Money,
    pub active: Vec<ActiveResource>,
    pub reserve: AccumulatorReserve,
}

impl EconomyState {
    pub fn new(budget: Money) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    /// Buy one unit of `definition` if the budget covers it.
    ///
    /// Returns false and leaves the state untouched when it does not.
    pub fn buy(&mut self, definition: &ResourceDefinition) -> bool {
        if self.budget < definition.cost {
            return false;
        }
        self.budget -= definition.cost;
        self.active.push(ActiveResource::from_definition(definition));
        true
    }

    /// Apply the turn's net cash flow. The budget may go negative.
    pub fn settle(&mut self, profit: Money, upkeep: Money) {
        self.budget = self.budget.saturating_add(profit).saturating_sub(upkeep);
    }
}
