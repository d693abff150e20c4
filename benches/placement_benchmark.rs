// benches/placement_benchmark.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use instrument_scatter::demo_scene::{demo_config, demo_scene_for};
use instrument_scatter::engine_lib::IterationOrchestrator;
use instrument_scatter::generator::{PoissonDiskSampler, DEFAULT_ATTEMPTS_PER_POINT};

fn placement_benchmark_fn(c: &mut Criterion) {
    let mut group = c.benchmark_group("PlacementOperations");

    group.bench_function("poisson_disk_10x10_r2", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            PoissonDiskSampler::generate(
                black_box(10.0),
                black_box(10.0),
                black_box(2.0),
                seed,
                DEFAULT_ATTEMPTS_PER_POINT,
            )
        })
    });

    group.bench_function("poisson_disk_100x100_r1", |b| {
        b.iter(|| PoissonDiskSampler::generate(black_box(100.0), black_box(100.0), black_box(1.0), 7, DEFAULT_ATTEMPTS_PER_POINT))
    });

    group.bench_function("iteration_start_end", |b| {
        let config = demo_config();
        let mut scene = demo_scene_for(&config);
        let mut orchestrator = IterationOrchestrator::new(config).expect("demo config is valid");
        b.iter(|| {
            let summary = orchestrator.on_iteration_start(&mut scene).expect("iteration starts");
            orchestrator.on_iteration_end(&mut scene);
            black_box(summary)
        })
    });

    group.bench_function("tick_8_joints", |b| {
        let config = demo_config();
        let mut scene = demo_scene_for(&config);
        let mut orchestrator = IterationOrchestrator::new(config).expect("demo config is valid");
        orchestrator.on_iteration_start(&mut scene).expect("iteration starts");
        b.iter(|| orchestrator.tick(&mut scene, black_box(1.0 / 60.0)))
    });
    group.finish();
}

criterion_group!(benches, placement_benchmark_fn);
criterion_main!(benches);
