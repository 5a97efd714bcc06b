#![deny(warnings)]

//! Purchase planning: which catalog resources to buy on a given turn.
//!
//! Two greedy heuristics are provided. Neither is optimal; they differ in
//! what they rank by and in when they stop buying, so they are kept as
//! separate strategies behind [`PurchasePlanner`].

use sim_core::{
    Money, PlannerKind, Power, ResourceCatalog, ResourceDefinition, ResourceId, TurnSpec,
};
use sim_econ::{committed_upkeep, operating_power, EconomyState};
use std::cmp::Ordering;
use tracing::trace;

/// Outcome of the purchase phase of a turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    /// Resources bought, in purchase order.
    pub purchased: Vec<ResourceId>,
    /// Power taken from the accumulator reserve before buying.
    pub drawn_from_reserve: Power,
}

/// A purchase strategy.
///
/// `plan` receives the bonus-adjusted turn and commits its purchases directly
/// to `state`: every purchase is paid from the budget at decision time and
/// only when the budget covers its cost.
pub trait PurchasePlanner {
    fn kind(&self) -> PlannerKind;

    fn plan(&self, catalog: &ResourceCatalog, turn: &TurnSpec, state: &mut EconomyState) -> Plan;
}

/// Build the strategy selected by `kind`.
pub fn planner_for(kind: PlannerKind) -> Box<dyn PurchasePlanner> {
    match kind {
        PlannerKind::Efficiency => Box::new(EfficiencyPlanner),
        PlannerKind::Sustainable => Box::new(SustainablePlanner),
    }
}

/// Buys every affordable resource, most power per unit of cost first.
///
/// Ties go to the cheaper resource, then to catalog order. There is no
/// demand target: buying continues down the list while money lasts.
#[derive(Clone, Copy, Debug, Default)]
pub struct EfficiencyPlanner;

impl PurchasePlanner for EfficiencyPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Efficiency
    }

    fn plan(&self, catalog: &ResourceCatalog, _turn: &TurnSpec, state: &mut EconomyState) -> Plan {
        let budget = state.budget;
        let mut candidates: Vec<&ResourceDefinition> =
            catalog.iter().filter(|r| r.cost <= budget).collect();
        candidates.sort_by(|a, b| power_per_cost(b, a).then_with(|| a.cost.cmp(&b.cost)));
        trace!(candidates = candidates.len(), budget, "efficiency candidates");

        let mut purchased = Vec::new();
        for r in candidates {
            if state.buy(r) {
                purchased.push(r.id);
            }
        }
        Plan {
            purchased,
            drawn_from_reserve: 0,
        }
    }
}

/// Covers the turn's minimum demand while protecting upkeep.
///
/// Draws on the accumulator reserve first, then buys powered resources
/// ordered by upkeep and then by cost per unit of power until the remaining
/// demand is met. A resource is only a candidate if, after paying for it, the
/// budget still covers the upkeep of the whole active set.
#[derive(Clone, Copy, Debug, Default)]
pub struct SustainablePlanner;

impl PurchasePlanner for SustainablePlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Sustainable
    }

    fn plan(&self, catalog: &ResourceCatalog, turn: &TurnSpec, state: &mut EconomyState) -> Plan {
        let mut available = operating_power(&state.active);
        let mut drawn = 0;
        if available < turn.minimum_demand && state.reserve.stored() > 0 {
            drawn = state.reserve.draw(turn.minimum_demand - available);
            available += drawn;
        }
        let mut needed = (turn.minimum_demand - available).max(0);

        let budget = state.budget;
        let upkeep = committed_upkeep(&state.active);
        let mut candidates: Vec<&ResourceDefinition> = catalog
            .iter()
            .filter(|r| r.cost <= budget && r.power_output > 0 && budget - r.cost >= upkeep)
            .collect();
        candidates.sort_by(|a, b| {
            a.upkeep_cost
                .cmp(&b.upkeep_cost)
                .then_with(|| cost_per_power(a, b))
        });
        trace!(
            candidates = candidates.len(),
            budget,
            upkeep,
            needed,
            drawn,
            "sustainable candidates"
        );

        let mut purchased = Vec::new();
        for r in candidates {
            if needed <= 0 {
                break;
            }
            if state.buy(r) {
                purchased.push(r.id);
                needed -= r.power_output;
            }
        }
        Plan {
            purchased,
            drawn_from_reserve: drawn,
        }
    }
}

/// Compare `a.power / a.cost` with `b.power / b.cost`, divisors floored at 1.
fn power_per_cost(a: &ResourceDefinition, b: &ResourceDefinition) -> Ordering {
    cross_ratio(a.power_output, a.cost, b.power_output, b.cost)
}

/// Compare `a.cost / a.power` with `b.cost / b.power`, divisors floored at 1.
fn cost_per_power(a: &ResourceDefinition, b: &ResourceDefinition) -> Ordering {
    cross_ratio(a.cost, a.power_output, b.cost, b.power_output)
}

fn cross_ratio(num_a: Money, den_a: Money, num_b: Money, den_b: Money) -> Ordering {
    let lhs = i128::from(num_a) * i128::from(den_b.max(1));
    let rhs = i128::from(num_b) * i128::from(den_a.max(1));
    lhs.cmp(&rhs)
}
