//! Example of clustering a batch of trajectories.
//!
//! Run with: cargo run --example batch_clustering --features parallel

use std::time::Instant;
use trajectory_cluster::{
    cluster_trajectories, ClusterConfig, Coordinate, DistanceStrategy, Trajectory, WindowSize,
};

fn main() {
    println!("Batch Trajectory Clustering Example\n");

    // Three corridors through an intersection
    let corridors: [&[(f64, f64)]; 3] = [
        &[(0.0, 500.0), (250.0, 500.0), (500.0, 500.0), (750.0, 500.0), (1000.0, 500.0)],
        &[(500.0, 0.0), (500.0, 250.0), (500.0, 500.0), (500.0, 750.0), (500.0, 1000.0)],
        &[(0.0, 0.0), (250.0, 250.0), (500.0, 500.0), (750.0, 750.0), (1000.0, 1000.0)],
    ];
    let counts = [6, 4, 2];

    let mut trajectories = Vec::new();
    for (c, (corridor, &count)) in corridors.iter().zip(counts.iter()).enumerate() {
        for i in 0..count {
            let points = add_noise(corridor, 3.0 * i as f64);
            let id = format!("corridor{}-{}", c, i);
            trajectories.push(Trajectory::new(id, "car", points).expect("valid trajectory"));
        }
    }

    println!("Created {} trajectories\n", trajectories.len());

    for strategy in [
        DistanceStrategy::BruteForce,
        DistanceStrategy::Indexed,
        DistanceStrategy::Raster,
    ] {
        let config = ClusterConfig {
            window_size: WindowSize::new(40),
            distance_threshold: 0.3,
            top_n: 3,
            strategy,
            ..ClusterConfig::default()
        };

        let start = Instant::now();
        let report = cluster_trajectories(&trajectories, &config).expect("clustering");
        let elapsed = start.elapsed();

        let (covered, total) = report.coverage();
        println!(
            "{:?}: {} of {} trajectories in top clusters ({:?})",
            strategy, covered, total, elapsed
        );
        for (rank, members) in report.big_clusters.iter() {
            let ids: Vec<&str> = members.iter().map(|&i| trajectories[i].id()).collect();
            println!("  Cluster {}: {:?}", rank, ids);
        }
        println!();
    }
}

/// Add small noise to points to simulate tracking variation
fn add_noise(points: &[(f64, f64)], noise: f64) -> Vec<Coordinate> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            Coordinate::new(
                x + noise * (i as f64 % 2.0 - 0.5),
                y + noise * ((i + 1) as f64 % 2.0 - 0.5),
            )
        })
        .collect()
}
