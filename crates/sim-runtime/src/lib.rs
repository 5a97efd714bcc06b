#![deny(warnings)]

//! Turn-by-turn runtime for the simulation.
//!
//! [`TurnSimulator`] owns the economy for the duration of a run and plays one
//! turn at a time; [`run_simulation`] drives it across every turn of a
//! scenario and collects the purchase records and final score.

use serde::Serialize;
use sim_ai::{planner_for, PurchasePlanner};
use sim_core::{
    ActiveResource, Money, Power, PurchaseRecord, ResourceCatalog, ResourceId, Scenario,
    SimConfig, TurnSpec,
};
use sim_econ::{
    aggregate_bonuses, operating_power, operating_upkeep, powered_buildings, turn_profit,
    BonusSet, EconomyState, LifecycleEngine,
};
use tracing::{debug, info};

/// Everything that happened during one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub turn: usize,
    /// Bonuses aggregated at the start of the turn.
    pub bonuses: BonusSet,
    /// Turn parameters after bonuses.
    pub adjusted: TurnSpec,
    pub purchased: Vec<ResourceId>,
    pub drawn_from_reserve: Power,
    /// Power of operating instances after purchases, before clamping.
    pub operating_power: Power,
    pub powered_buildings: Power,
    pub profit: Money,
    pub upkeep: Money,
    pub banked: Power,
    pub budget_after: Money,
    pub expired: Vec<ResourceId>,
    pub active_after: usize,
}

impl TurnReport {
    /// Purchase record for this turn, if anything was bought.
    pub fn purchase_record(&self) -> Option<PurchaseRecord> {
        if self.purchased.is_empty() {
            None
        } else {
            Some(PurchaseRecord {
                turn: self.turn,
                purchased: self.purchased.clone(),
            })
        }
    }
}

/// Plays turns against a catalog, owning budget, active set and reserve.
pub struct TurnSimulator {
    catalog: ResourceCatalog,
    config: SimConfig,
    planner: Box<dyn PurchasePlanner>,
    lifecycle: LifecycleEngine,
    state: EconomyState,
    score: Money,
    turns_played: usize,
}

impl TurnSimulator {
    pub fn new(catalog: ResourceCatalog, budget: Money, config: SimConfig) -> Self {
        Self {
            catalog,
            planner: planner_for(config.planner),
            lifecycle: LifecycleEngine::new(config.lifecycle),
            config,
            state: EconomyState::new(budget),
            score: 0,
            turns_played: 0,
        }
    }

    pub fn score(&self) -> Money {
        self.score
    }

    pub fn budget(&self) -> Money {
        self.state.budget
    }

    pub fn active(&self) -> &[ActiveResource] {
        &self.state.active
    }

    pub fn reserve(&self) -> Power {
        self.state.reserve.stored()
    }

    pub fn turns_played(&self) -> usize {
        self.turns_played
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Play the next turn with parameters `spec`.
    pub fn step(&mut self, spec: &TurnSpec) -> TurnReport {
        let turn = self.turns_played;

        let bonuses = aggregate_bonuses(&self.state.active);
        let adjusted = bonuses.adjust_turn(spec);
        if self.config.instance_bonuses {
            bonuses.boost_instances(&mut self.state.active);
        }

        let plan = self.planner.plan(&self.catalog, &adjusted, &mut self.state);

        let power = operating_power(&self.state.active);
        let powered = powered_buildings(power, &adjusted);
        let profit = turn_profit(powered, &adjusted);
        self.score = self.score.saturating_add(profit);

        let upkeep = operating_upkeep(&self.state.active);
        self.state.settle(profit, upkeep);

        let mut banked = 0;
        if self.config.accumulator && bonuses.has_accumulator() {
            banked = (power - adjusted.maximum_demand).max(0);
            self.state.reserve.bank(banked);
        }

        let expired = self.lifecycle.advance(&mut self.state.active);
        self.turns_played += 1;

        debug!(
            turn,
            min = adjusted.minimum_demand,
            max = adjusted.maximum_demand,
            rate = adjusted.profit_rate,
            purchased = plan.purchased.len(),
            powered,
            profit,
            upkeep,
            budget = self.state.budget,
            "turn complete"
        );

        TurnReport {
            turn,
            bonuses,
            adjusted,
            purchased: plan.purchased,
            drawn_from_reserve: plan.drawn_from_reserve,
            operating_power: power,
            powered_buildings: powered,
            profit,
            upkeep,
            banked,
            budget_after: self.state.budget,
            expired,
            active_after: self.state.active.len(),
        }
    }
}

/// Result of a full run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulationOutcome {
    /// One record per turn that had purchases, in turn order.
    pub records: Vec<PurchaseRecord>,
    pub score: Money,
    pub final_budget: Money,
    pub reports: Vec<TurnReport>,
}

/// Simulator positioned before the first turn of `scenario`.
pub fn init_simulation(scenario: &Scenario, config: SimConfig) -> TurnSimulator {
    TurnSimulator::new(scenario.resources.clone(), scenario.budget, config)
}

/// Play `turns` in order on an existing simulator.
pub fn run_turns(sim: &mut TurnSimulator, turns: &[TurnSpec]) -> Vec<TurnReport> {
    turns.iter().map(|spec| sim.step(spec)).collect()
}

/// Run every turn of `scenario` and collect records and score.
pub fn run_simulation(scenario: &Scenario, config: SimConfig) -> SimulationOutcome {
    let mut sim = init_simulation(scenario, config);
    let reports = run_turns(&mut sim, &scenario.turns);
    let records: Vec<PurchaseRecord> = reports
        .iter()
        .filter_map(TurnReport::purchase_record)
        .collect();
    info!(
        planner = ?sim.config().planner,
        lifecycle = ?sim.config().lifecycle,
        turns = reports.len(),
        purchase_turns = records.len(),
        score = sim.score(),
        budget = sim.budget(),
        "simulation finished"
    );
    SimulationOutcome {
        records,
        score: sim.score(),
        final_budget: sim.budget(),
        reports,
    }
}
