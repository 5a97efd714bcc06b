//! Special-effect bonuses derived from the active resource set.

use serde::{Deserialize, Serialize};
use sim_core::{ActiveResource, EffectType, TurnSpec};

/// Aggregate effect magnitudes for one turn, keyed by effect type.
///
/// Magnitudes of the same type stack additively. Every active instance
/// contributes, whether it is operating or in maintenance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSet {
    pub smart_meter: i64,
    pub distribution_facility: i64,
    pub maintenance_plan: i64,
    pub renewable_plant: i64,
    pub accumulator: i64,
}

impl BonusSet {
    /// Total magnitude recorded for `effect`; always 0 for `EffectType::None`.
    pub fn get(&self, effect: EffectType) -> i64 {
        match effect {
            EffectType::None => 0,
            EffectType::SmartMeter => self.smart_meter,
            EffectType::DistributionFacility => self.distribution_facility,
            EffectType::MaintenancePlan => self.maintenance_plan,
            EffectType::RenewablePlant => self.renewable_plant,
            EffectType::Accumulator => self.accumulator,
        }
    }

    fn add(&mut self, effect: EffectType, magnitude: i64) {
        let slot = match effect {
            EffectType::None => return,
            EffectType::SmartMeter => &mut self.smart_meter,
            EffectType::DistributionFacility => &mut self.distribution_facility,
            EffectType::MaintenancePlan => &mut self.maintenance_plan,
            EffectType::RenewablePlant => &mut self.renewable_plant,
            EffectType::Accumulator => &mut self.accumulator,
        };
        *slot = slot.saturating_add(magnitude);
    }

    pub fn has_accumulator(&self) -> bool {
        self.accumulator > 0
    }

    /// Turn parameters raised by the Distribution-Facility (demand bounds) and
    /// Renewable-Plant (profit rate) percentages.
    pub fn adjust_turn(&self, turn: &TurnSpec) -> TurnSpec {
        TurnSpec {
            minimum_demand: apply_percent(turn.minimum_demand, self.distribution_facility),
            maximum_demand: apply_percent(turn.maximum_demand, self.distribution_facility),
            profit_rate: apply_percent(turn.profit_rate, self.renewable_plant),
        }
    }

    /// Recompute boosted power and life of every instance from its base values.
    ///
    /// Smart-Meter instances get the Smart-Meter percentage on power output;
    /// Maintenance-Plan instances get the Maintenance-Plan percentage on their
    /// remaining life. Everyone else is reset to base values. The lifecycle
    /// step consumes life from `boosted_life`, so the life boost persists.
    pub fn boost_instances(&self, active: &mut [ActiveResource]) {
        for inst in active.iter_mut() {
            let base_power = inst.definition.power_output;
            inst.boosted_power_output = match inst.definition.effect_type {
                EffectType::SmartMeter => apply_percent(base_power, self.smart_meter),
                _ => base_power,
            };
            inst.boosted_life = match inst.definition.effect_type {
                EffectType::MaintenancePlan => inst.remaining_life.map(|life| {
                    let boosted = apply_percent(i64::from(life), self.maintenance_plan);
                    u32::try_from(boosted.max(0)).unwrap_or(u32::MAX)
                }),
                _ => inst.remaining_life,
            };
        }
    }
}

/// Sum effect magnitudes over the active set, grouped by effect type.
pub fn aggregate_bonuses(active: &[ActiveResource]) -> BonusSet {
    active
        .iter()
        .filter(|inst| inst.definition.is_special())
        .fold(BonusSet::default(), |mut set, inst| {
            set.add(inst.definition.effect_type, inst.definition.effect_magnitude);
            set
        })
}

/// `value + value * pct / 100` with truncation toward zero.
pub fn apply_percent(value: i64, pct: i64) -> i64 {
    value.saturating_add(value.saturating_mul(pct) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{ResourceDefinition, ResourceId};

    fn special(id: u32, effect: EffectType, magnitude: i64) -> ActiveResource {
        ActiveResource::from_definition(&ResourceDefinition {
            id: ResourceId(id),
            cost: 5,
            upkeep_cost: 1,
            operating_duration: 2,
            maintenance_duration: 1,
            lifespan_cycles: 10,
            power_output: 10,
            effect_type: effect,
            effect_magnitude: magnitude,
        })
    }

    #[test]
    fn magnitudes_stack_per_type() {
        let active = vec![
            special(1, EffectType::DistributionFacility, 10),
            special(2, EffectType::DistributionFacility, 15),
            special(3, EffectType::RenewablePlant, 50),
            special(4, EffectType::None, 99),
        ];
        let set = aggregate_bonuses(&active);
        assert_eq!(set.distribution_facility, 25);
        assert_eq!(set.renewable_plant, 50);
        assert_eq!(set.get(EffectType::None), 0);
        assert!(!set.has_accumulator());
    }

    #[test]
    fn maintenance_does_not_suppress_effects() {
        let mut inst = special(1, EffectType::Accumulator, 3);
        inst.duty_counter = -1;
        let set = aggregate_bonuses(&[inst]);
        assert_eq!(set.accumulator, 3);
        assert!(set.has_accumulator());
    }

    #[test]
    fn turn_adjustment_truncates() {
        let set = BonusSet {
            distribution_facility: 10,
            renewable_plant: 33,
            ..BonusSet::default()
        };
        let turn = TurnSpec {
            minimum_demand: 15,
            maximum_demand: 29,
            profit_rate: 10,
        };
        let adjusted = set.adjust_turn(&turn);
        assert_eq!(adjusted.minimum_demand, 16);
        assert_eq!(adjusted.maximum_demand, 31);
        assert_eq!(adjusted.profit_rate, 13);
    }

    #[test]
    fn boosts_do_not_compound() {
        let mut active = vec![
            special(1, EffectType::SmartMeter, 50),
            special(2, EffectType::MaintenancePlan, 20),
            special(3, EffectType::None, 0),
        ];
        let set = aggregate_bonuses(&active);
        set.boost_instances(&mut active);
        set.boost_instances(&mut active);
        assert_eq!(active[0].boosted_power_output, 15);
        assert_eq!(active[1].boosted_life, Some(12));
        assert_eq!(active[1].remaining_life, Some(10));
        assert_eq!(active[2].boosted_power_output, 10);
    }

    proptest! {
        #[test]
        fn aggregation_is_pure(mags in proptest::collection::vec((0usize..6, -50i64..200), 0..20)) {
            let active: Vec<ActiveResource> = mags
                .iter()
                .enumerate()
                .map(|(i, &(kind, m))| {
                    let effect = EffectType::SPECIAL.get(kind).copied().unwrap_or(EffectType::None);
                    special(i as u32, effect, m)
                })
                .collect();
            let first = aggregate_bonuses(&active);
            let second = aggregate_bonuses(&active);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn percent_is_monotonic_for_positive_bonus(v in 0i64..1_000_000, pct in 0i64..500) {
            prop_assert!(apply_percent(v, pct) >= v);
            prop_assert_eq!(apply_percent(v, 0), v);
        }
    }
}
