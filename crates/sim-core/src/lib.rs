#![deny(warnings)]

//! Core domain models and invariants for Grid Tycoon.
//!
//! This crate defines the serializable types shared by the simulation: the
//! immutable resource catalog and turn parameters loaded from a scenario, the
//! mutable resource instances a running simulation owns, the engine
//! configuration, and validation helpers to guarantee basic invariants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Budget, cost, upkeep and profit amounts.
pub type Money = i64;

/// Number of buildings a resource (or a set of them) can power.
pub type Power = i64;

/// Unique identifier of a purchasable resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Special effect carried by a resource while it is active.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// No special effect.
    #[default]
    None,
    /// Raises the power output of smart-meter resources (percent).
    SmartMeter,
    /// Raises the minimum and maximum building demand of a turn (percent).
    DistributionFacility,
    /// Raises the remaining life of maintenance-plan resources (percent).
    MaintenancePlan,
    /// Raises the profit rate of a turn (percent).
    RenewablePlant,
    /// Enables banking of surplus power.
    Accumulator,
}

impl EffectType {
    /// All effect types that actually modify the simulation.
    pub const SPECIAL: [EffectType; 5] = [
        EffectType::SmartMeter,
        EffectType::DistributionFacility,
        EffectType::MaintenancePlan,
        EffectType::RenewablePlant,
        EffectType::Accumulator,
    ];
}

/// A purchasable resource as listed in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Catalog identifier.
    pub id: ResourceId,
    /// Purchase price.
    pub cost: Money,
    /// Upkeep charged for every turn the resource is operating.
    pub upkeep_cost: Money,
    /// Turns of operation before maintenance is due.
    pub operating_duration: u32,
    /// Turns spent in maintenance before operating again.
    pub maintenance_duration: u32,
    /// Lifespan; 0 means the resource never expires.
    pub lifespan_cycles: u32,
    /// Buildings powered while operating.
    pub power_output: Power,
    /// Special effect kind.
    #[serde(default)]
    pub effect_type: EffectType,
    /// Effect strength; only meaningful when `effect_type` is not `None`.
    #[serde(default)]
    pub effect_magnitude: i64,
}

impl ResourceDefinition {
    /// Whether this resource contributes a special effect.
    pub fn is_special(&self) -> bool {
        self.effect_type != EffectType::None
    }
}

/// Immutable set of resource definitions, loaded once per run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCatalog {
    resources: Vec<ResourceDefinition>,
}

impl ResourceCatalog {
    pub fn new(resources: Vec<ResourceDefinition>) -> Self {
        Self { resources }
    }

    /// Definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.iter()
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Demand bounds and profit rate of a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSpec {
    /// Buildings that must be powered for the turn to pay out.
    pub minimum_demand: Power,
    /// Buildings that can be powered at most.
    pub maximum_demand: Power,
    /// Profit per powered building.
    pub profit_rate: Money,
}

/// A fully parsed scenario: starting budget, catalog and turn sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Initial budget.
    pub budget: Money,
    /// Purchasable resources.
    pub resources: ResourceCatalog,
    /// Turns, in the order they are played.
    pub turns: Vec<TurnSpec>,
}

/// A resource owned by the running simulation.
///
/// Instances are value copies of their catalog definition with no link back to
/// the catalog. `duty_counter` is positive while operating, zero on the turn
/// before maintenance, and negative while in maintenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveResource {
    /// Copy of the purchased definition.
    pub definition: ResourceDefinition,
    /// Duty-cycle counter.
    pub duty_counter: i64,
    /// Remaining life; `None` never expires.
    pub remaining_life: Option<u32>,
    /// Power output after this turn's bonuses.
    pub boosted_power_output: Power,
    /// Remaining life after this turn's bonuses.
    pub boosted_life: Option<u32>,
}

impl ActiveResource {
    /// Fresh instance with counters initialized from its definition.
    pub fn from_definition(definition: &ResourceDefinition) -> Self {
        let remaining_life = match definition.lifespan_cycles {
            0 => None,
            n => Some(n),
        };
        Self {
            duty_counter: i64::from(definition.operating_duration),
            remaining_life,
            boosted_power_output: definition.power_output,
            boosted_life: remaining_life,
            definition: definition.clone(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.definition.id
    }

    pub fn is_operating(&self) -> bool {
        self.duty_counter > 0
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_life == Some(0)
    }

    /// Buildings powered this turn: the boosted output while operating, else 0.
    pub fn current_power(&self) -> Power {
        if self.is_operating() {
            self.boosted_power_output
        } else {
            0
        }
    }

    /// Upkeep due this turn: charged only while operating.
    pub fn current_upkeep(&self) -> Money {
        if self.is_operating() {
            self.definition.upkeep_cost
        } else {
            0
        }
    }
}

/// Purchases made during one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Zero-based turn index.
    pub turn: usize,
    /// Purchased resource ids, in purchase order.
    pub purchased: Vec<ResourceId>,
}

impl PurchaseRecord {
    pub fn count(&self) -> usize {
        self.purchased.len()
    }
}

/// Purchase heuristic used each turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerKind {
    /// Buy everything affordable, best power per cost first.
    Efficiency,
    /// Buy only what the turn's demand needs, lowest upkeep first.
    #[default]
    Sustainable,
}

/// How active resources age.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleMode {
    /// Single countdown; one lifespan cycle is consumed per completed countdown.
    Countdown,
    /// Operate/maintain duty cycle; life decreases every turn.
    #[default]
    DutyCycle,
}

/// Simulation configuration parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Purchase heuristic.
    pub planner: PlannerKind,
    /// Aging model.
    pub lifecycle: LifecycleMode,
    /// Apply Smart-Meter and Maintenance-Plan boosts to individual instances.
    pub instance_bonuses: bool,
    /// Bank surplus power and draw on it to cover deficits.
    pub accumulator: bool,
}

impl SimConfig {
    /// Single-countdown model with additive turn bonuses only.
    pub fn simple() -> Self {
        Self {
            planner: PlannerKind::Efficiency,
            lifecycle: LifecycleMode::Countdown,
            instance_bonuses: false,
            accumulator: false,
        }
    }

    /// Duty-cycle model with per-instance bonuses and energy banking.
    pub fn extended() -> Self {
        Self {
            planner: PlannerKind::Sustainable,
            lifecycle: LifecycleMode::DutyCycle,
            instance_bonuses: true,
            accumulator: true,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::extended()
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price or cost must be non-negative.
    #[error("resource {0}: negative monetary value is invalid")]
    NegativeMoney(ResourceId),
    /// Power output must be non-negative.
    #[error("resource {0}: power output must be >= 0")]
    NegativePower(ResourceId),
    /// Resource ids must be unique within the catalog.
    #[error("duplicate resource id: {0}")]
    DuplicateResourceId(ResourceId),
    /// Demand and profit values must be non-negative.
    #[error("turn {0}: demand and profit rate must be >= 0")]
    NegativeTurnValue(usize),
}

/// Validate a single resource definition.
pub fn validate_resource(r: &ResourceDefinition) -> Result<(), ValidationError> {
    if r.cost < 0 || r.upkeep_cost < 0 {
        return Err(ValidationError::NegativeMoney(r.id));
    }
    if r.power_output < 0 {
        return Err(ValidationError::NegativePower(r.id));
    }
    Ok(())
}

/// Validate the parameters of turn `index`.
///
/// Minimum demand above maximum demand is accepted: such a turn simply
/// cannot reach its minimum and earns nothing.
pub fn validate_turn(index: usize, t: &TurnSpec) -> Result<(), ValidationError> {
    if t.minimum_demand < 0 || t.maximum_demand < 0 || t.profit_rate < 0 {
        return Err(ValidationError::NegativeTurnValue(index));
    }
    Ok(())
}

/// Validate a scenario, including catalog-wide id uniqueness.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<ResourceId> = BTreeSet::new();
    for r in scenario.resources.iter() {
        validate_resource(r)?;
        if !ids.insert(r.id) {
            return Err(ValidationError::DuplicateResourceId(r.id));
        }
    }
    for (i, t) in scenario.turns.iter().enumerate() {
        validate_turn(i, t)?;
    }
    Ok(())
}
