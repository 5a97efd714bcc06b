use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_ai::planner_for;
use sim_core::PlannerKind;
use sim_econ::EconomyState;

fn bench_planners(c: &mut Criterion) {
    let scenario = data_pipeline::synthetic_scenario(42, 200, 1);
    let turn = scenario.turns[0];
    for kind in [PlannerKind::Efficiency, PlannerKind::Sustainable] {
        let planner = planner_for(kind);
        c.bench_function(&format!("plan {kind:?} 200 resources"), |b| {
            b.iter(|| {
                let mut state = EconomyState::new(scenario.budget);
                black_box(planner.plan(&scenario.resources, &turn, &mut state))
            })
        });
    }
}

criterion_group!(benches, bench_planners);
criterion_main!(benches);
