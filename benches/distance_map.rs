use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trajectory_cluster::{
    Coordinate, DistanceMapBuilder, DistanceStrategy, Trajectory, WindowSize,
};

/// Deterministic batch of wavy east-west paths in a few lanes.
fn synthetic_batch(n: usize, points: usize) -> Vec<Trajectory> {
    (0..n)
        .map(|t| {
            let lane = (t % 5) as f64 * 150.0;
            let coords = (0..points)
                .map(|i| {
                    let x = i as f64 * 20.0;
                    let y = lane + ((i * 7 + t * 13) % 11) as f64;
                    Coordinate::new(x, y)
                })
                .collect();
            Trajectory::new(format!("t{t}"), "car", coords).unwrap()
        })
        .collect()
}

fn bench_distance_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_map");
    group.sample_size(10);
    let window = WindowSize::new(30);

    for n in [25, 100, 400] {
        let batch = synthetic_batch(n, 60);
        for strategy in [
            DistanceStrategy::BruteForce,
            DistanceStrategy::Indexed,
            DistanceStrategy::Raster,
        ] {
            let builder = DistanceMapBuilder::new(window).with_strategy(strategy);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), n),
                &batch,
                |b, batch| b.iter(|| builder.build(black_box(batch)).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_distance_map);
criterion_main!(benches);
