//! Performance benchmarks for the epic bridge.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epic_bridge::{Action, EpicPlugin, EpicStore, MemoryStore, QueueScheduler};
use std::sync::Arc;

fn counter_with_epics(epics: usize) -> (EpicPlugin<i64>, EpicStore<MemoryStore<i64>>) {
    let store = MemoryStore::builder(0i64)
        .mutation("increment", |count, _| *count += 1)
        .build();
    let plugin: EpicPlugin<i64> = EpicPlugin::default();
    let store = plugin.install(Arc::new(store)).unwrap();

    for _ in 0..epics {
        plugin
            .run(|actions, _, _| Some(actions.of_type(&["tick"]).map(|_| Action::named("increment"))))
            .unwrap();
    }

    (plugin, store)
}

/// Benchmark dispatch round trips with varying numbers of listening epics
fn bench_dispatch_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_fanout");

    for epics in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("epics", epics), &epics, |b, &epics| {
            let (_plugin, store) = counter_with_epics(epics);
            b.iter(|| {
                store.dispatch_action(black_box("tick")).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark commits with a state tap attached
fn bench_commit(c: &mut Criterion) {
    let (_plugin, store) = counter_with_epics(0);
    let states = store.state_view().tap();

    c.bench_function("commit_with_tap", |b| {
        b.iter(|| {
            store.commit_action(black_box("increment")).unwrap();
            black_box(states.drain());
        });
    });
}

/// Benchmark raw scheduler throughput with nested scheduling
fn bench_scheduler(c: &mut Criterion) {
    let scheduler = QueueScheduler::new();

    c.bench_function("scheduler_nested_1000", |b| {
        b.iter(|| {
            let s = scheduler.clone();
            scheduler.schedule(move || {
                for i in 0..1000u32 {
                    s.schedule(move || {
                        black_box(i);
                    });
                }
            });
        });
    });
}

criterion_group!(benches, bench_dispatch_fanout, bench_commit, bench_scheduler);
criterion_main!(benches);
