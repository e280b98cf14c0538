//! Basic example of comparing trajectories.
//!
//! Run with: cargo run --example basic_similarity

use trajectory_cluster::{build_distance_map, Coordinate, Trajectory, WindowSize};

fn main() {
    let path = |points: &[(f64, f64)]| -> Vec<Coordinate> {
        points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    };

    // Eastbound lane
    let lane = path(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0), (300.0, 0.0)]);
    let lane = Trajectory::new("car-1", "car", lane).expect("valid trajectory");

    // Same lane, slightly offset
    let offset = path(&[(5.0, 8.0), (105.0, 8.0), (205.0, 8.0), (305.0, 8.0)]);
    let offset = Trajectory::new("car-2", "car", offset).expect("valid trajectory");

    // Turns north halfway
    let turning = path(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (100.0, 200.0)]);
    let turning = Trajectory::new("car-3", "car", turning).expect("valid trajectory");

    let window = WindowSize::new(20);
    println!("Trajectory Similarity Examples (window={})\n", window.get());

    println!("1. Same lane (car-1 vs car-2): {:.2}", lane.similarity(&offset, window));
    println!("2. Shared start (car-1 vs car-3): {:.2}", lane.similarity(&turning, window));
    println!("3. Self (car-1 vs car-1): {:.2}\n", lane.similarity(&lane, window));

    let batch = vec![lane, offset, turning];
    let matrix = build_distance_map(&batch, window).expect("distance map");

    println!("Distance map:");
    for (i, row) in matrix.rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|d| format!("{:.2}", d)).collect();
        println!("  {}: [{}]", batch[i].id(), cells.join(", "));
    }
}
