//! Projection benchmarks: reference scan vs sorted index, plus metric evaluation

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use yardsim_core::metrics::{definitions_for, evaluate, MetricContext};
use yardsim_core::{
    project, ActorKind, Door, EventIndex, EventType, Scenario, SimActor, SimEvent, SimMode, SimTab,
};

/// An ops scenario with `trucks` full visits spread over an hour
fn ops_scenario(trucks: usize) -> Scenario {
    let duration = 3600.0;
    let mut scenario = Scenario::new("bench", SimTab::Ops, SimMode::After, duration);
    for d in 1..=4 {
        scenario = scenario.door(Door::new(
            format!("D{d}"),
            format!("Door {d}"),
            Default::default(),
        ));
    }
    for i in 0..trucks {
        let id = format!("t{i}");
        let door = format!("D{}", i % 4 + 1);
        let t0 = (i as f64 * 37.0) % (duration - 300.0);
        scenario = scenario
            .actor(SimActor::new(id.clone(), ActorKind::Truck, id.clone()))
            .events([
                SimEvent::new(format!("{id}_arrive"), t0, EventType::Arrive).actor(id.clone()),
                SimEvent::new(format!("{id}_queue"), t0 + 10.0, EventType::QueueStart)
                    .actor(id.clone()),
                SimEvent::new(format!("{id}_door"), t0 + 60.0, EventType::AssignedDoor)
                    .actor(id.clone())
                    .door(door.clone()),
                SimEvent::new(format!("{id}_load"), t0 + 90.0, EventType::LoadingStart)
                    .actor(id.clone())
                    .door(door.clone()),
                SimEvent::new(format!("{id}_done"), t0 + 200.0, EventType::LoadingEnd)
                    .actor(id.clone())
                    .door(door),
                SimEvent::new(format!("{id}_exit"), t0 + 280.0, EventType::ExitRoad).actor(id),
            ]);
    }
    scenario
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    for trucks in [10, 50, 200] {
        let scenario = ops_scenario(trucks);
        let index = EventIndex::new(&scenario);

        group.bench_with_input(BenchmarkId::new("scan", trucks), &scenario, |b, s| {
            b.iter(|| project(s, black_box(1800.0)))
        });
        group.bench_with_input(BenchmarkId::new("index", trucks), &index, |b, index| {
            b.iter(|| index.fired_count(black_box(1800.0)))
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let scenario = ops_scenario(50);
    let index = EventIndex::new(&scenario);
    let log = index.log_at(1800.0);

    c.bench_function("ops_metrics_frame", |b| {
        b.iter(|| {
            let ctx = MetricContext::new(&scenario, log, black_box(1800.0));
            evaluate(definitions_for(SimTab::Ops), &ctx)
        })
    });
}

criterion_group!(benches, bench_projection, bench_metrics);
criterion_main!(benches);
