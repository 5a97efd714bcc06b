//! Per-instance aging: duty cycles, maintenance and expiry.

use sim_core::{ActiveResource, LifecycleMode, ResourceId};
use tracing::debug;

/// Observable state of an active instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Operating,
    EnteringMaintenance,
    Maintaining,
    Expired,
}

/// Classify an instance. Expiry takes precedence over duty state.
pub fn lifecycle_state(inst: &ActiveResource) -> LifecycleState {
    if inst.is_expired() {
        LifecycleState::Expired
    } else if inst.duty_counter > 0 {
        LifecycleState::Operating
    } else if inst.duty_counter == 0 {
        LifecycleState::EnteringMaintenance
    } else {
        LifecycleState::Maintaining
    }
}

/// Advances every active instance by one turn and retires expired ones.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleEngine {
    mode: LifecycleMode,
}

impl LifecycleEngine {
    pub fn new(mode: LifecycleMode) -> Self {
        Self { mode }
    }

    /// Next-turn state of a single instance.
    ///
    /// Life is consumed from the boosted value, so a Maintenance-Plan bonus
    /// applied this turn carries over into the instance's remaining life.
    pub fn step(&self, inst: &ActiveResource) -> ActiveResource {
        let mut next = inst.clone();
        next.remaining_life = next.boosted_life;
        match self.mode {
            LifecycleMode::DutyCycle => step_duty_cycle(&mut next),
            LifecycleMode::Countdown => step_countdown(&mut next),
        }
        next.boosted_life = next.remaining_life;
        next
    }

    /// Age the whole active set and drop expired instances.
    ///
    /// Next states are computed for every instance first, then survivors are
    /// kept in purchase order. Returns the ids of the retired instances.
    pub fn advance(&self, active: &mut Vec<ActiveResource>) -> Vec<ResourceId> {
        let next: Vec<ActiveResource> = active.iter().map(|inst| self.step(inst)).collect();
        let (expired, surviving): (Vec<_>, Vec<_>) =
            next.into_iter().partition(ActiveResource::is_expired);
        *active = surviving;
        let expired: Vec<ResourceId> = expired.iter().map(ActiveResource::id).collect();
        if !expired.is_empty() {
            debug!(?expired, remaining = active.len(), "resources expired");
        }
        expired
    }
}

fn step_duty_cycle(inst: &mut ActiveResource) {
    let def = &inst.definition;
    if inst.duty_counter > 0 {
        inst.duty_counter -= 1;
    } else if inst.duty_counter == 0 && def.maintenance_duration > 0 {
        inst.duty_counter = -i64::from(def.maintenance_duration);
    } else if inst.duty_counter < 0 {
        inst.duty_counter += 1;
        if inst.duty_counter == 0 {
            inst.duty_counter = i64::from(def.operating_duration);
        }
    }
    consume_life(inst);
}

fn step_countdown(inst: &mut ActiveResource) {
    if inst.duty_counter > 0 {
        inst.duty_counter -= 1;
    }
    if inst.duty_counter <= 0 {
        inst.duty_counter = i64::from(inst.definition.operating_duration);
        consume_life(inst);
    }
}

fn consume_life(inst: &mut ActiveResource) {
    if let Some(life) = inst.remaining_life.as_mut() {
        *life = life.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{EffectType, ResourceDefinition};

    fn inst(operating: u32, maintenance: u32, lifespan: u32) -> ActiveResource {
        ActiveResource::from_definition(&ResourceDefinition {
            id: ResourceId(1),
            cost: 1,
            upkeep_cost: 1,
            operating_duration: operating,
            maintenance_duration: maintenance,
            lifespan_cycles: lifespan,
            power_output: 1,
            effect_type: EffectType::None,
            effect_magnitude: 0,
        })
    }

    fn duty_trace(engine: LifecycleEngine, mut r: ActiveResource, turns: usize) -> Vec<i64> {
        let mut out = vec![r.duty_counter];
        for _ in 0..turns {
            r = engine.step(&r);
            out.push(r.duty_counter);
        }
        out
    }

    #[test]
    fn duty_cycle_operates_then_maintains() {
        let engine = LifecycleEngine::new(LifecycleMode::DutyCycle);
        let trace = duty_trace(engine, inst(2, 2, 0), 8);
        assert_eq!(trace, vec![2, 1, 0, -2, -1, 2, 1, 0, -2]);
    }

    #[test]
    fn duty_cycle_without_maintenance_stalls_at_zero() {
        let engine = LifecycleEngine::new(LifecycleMode::DutyCycle);
        let trace = duty_trace(engine, inst(2, 0, 0), 5);
        assert_eq!(trace, vec![2, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn boosted_life_is_consumed() {
        let engine = LifecycleEngine::new(LifecycleMode::DutyCycle);
        let mut r = inst(3, 0, 2);
        r.remaining_life = Some(1);
        r.boosted_life = Some(2);
        let next = engine.step(&r);
        assert_eq!(next.remaining_life, Some(1));
        assert_eq!(next.boosted_life, Some(1));
        assert!(!next.is_expired());
    }

    #[test]
    fn states_follow_counter() {
        let mut r = inst(1, 1, 3);
        assert_eq!(lifecycle_state(&r), LifecycleState::Operating);
        r.duty_counter = 0;
        assert_eq!(lifecycle_state(&r), LifecycleState::EnteringMaintenance);
        r.duty_counter = -1;
        assert_eq!(lifecycle_state(&r), LifecycleState::Maintaining);
        r.remaining_life = Some(0);
        assert_eq!(lifecycle_state(&r), LifecycleState::Expired);
    }

    #[test]
    fn expires_mid_maintenance() {
        let engine = LifecycleEngine::new(LifecycleMode::DutyCycle);
        let mut r = inst(1, 5, 3);
        r.duty_counter = -3;
        let mut active = vec![r];
        assert!(engine.advance(&mut active).is_empty());
        assert!(engine.advance(&mut active).is_empty());
        assert_eq!(engine.advance(&mut active), vec![ResourceId(1)]);
        assert!(active.is_empty());
    }

    #[test]
    fn countdown_consumes_one_cycle_per_reset() {
        let engine = LifecycleEngine::new(LifecycleMode::Countdown);
        let mut r = inst(3, 7, 2);
        for expected_life in [2, 2, 1, 1, 1, 0] {
            r = engine.step(&r);
            assert_eq!(r.remaining_life, Some(expected_life));
            assert!(r.duty_counter > 0);
        }
    }

    #[test]
    fn survivors_keep_purchase_order() {
        let engine = LifecycleEngine::new(LifecycleMode::DutyCycle);
        let mut active: Vec<ActiveResource> = [4, 1, 3, 1, 2]
            .iter()
            .enumerate()
            .map(|(i, &life)| {
                let mut r = inst(1, 0, life);
                r.definition.id = ResourceId(i as u32);
                r
            })
            .collect();
        let expired = engine.advance(&mut active);
        assert_eq!(expired, vec![ResourceId(1), ResourceId(3)]);
        let ids: Vec<u32> = active.iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![0, 2, 4]);
    }

    proptest! {
        #[test]
        fn duty_life_drops_by_one_each_turn(op in 0u32..6, maint in 0u32..6, life in 1u32..30) {
            let engine = LifecycleEngine::new(LifecycleMode::DutyCycle);
            let mut active = vec![inst(op, maint, life)];
            for turn in 1..=life {
                let before = active[0].remaining_life;
                let expired = engine.advance(&mut active);
                if turn == life {
                    prop_assert_eq!(expired.len(), 1);
                    prop_assert!(active.is_empty());
                } else {
                    prop_assert_eq!(active[0].remaining_life, before.map(|l| l - 1));
                }
            }
        }

        #[test]
        fn countdown_life_never_increases(op in 0u32..6, life in 1u32..10, turns in 1usize..60) {
            let engine = LifecycleEngine::new(LifecycleMode::Countdown);
            let mut active = vec![inst(op, 0, life)];
            let mut last = Some(life);
            for _ in 0..turns {
                engine.advance(&mut active);
                match active.first() {
                    Some(r) => {
                        prop_assert!(r.remaining_life <= last);
                        last = r.remaining_life;
                    }
                    None => break,
                }
            }
        }
    }
}
