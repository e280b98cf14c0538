//! Cluster a JSON trajectory file, print the most common routes and write the
//! full report as JSON.
//!
//! Run with: cargo run --example cluster_json -- data/trajectories.json [report.json]

use std::env;
use std::fs;
use std::process::ExitCode;

use trajectory_cluster::{cluster_trajectories, load_trajectories, ClusterConfig};

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data/trajectories.json".to_string());
    let report_path = args.next();
    let config = ClusterConfig::default();

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Failed to read {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let trajectories = match load_trajectories(&contents, config.sample_size) {
        Ok(trajectories) => trajectories,
        Err(err) => {
            eprintln!("Failed to load trajectories: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let report = match cluster_trajectories(&trajectories, &config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Clustering failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    for (rank, members) in report.big_clusters.iter() {
        println!("Cluster {}: {} trajectories", rank, members.len());
        for &i in members {
            let (xs, _) = trajectories[i].export();
            let t = &trajectories[i];
            println!("  {} ({}, {} points)", t.id(), t.kind(), xs.len());
        }
    }

    let (covered, total) = report.coverage();
    println!(
        "Most common {} routes ({} of {} trajectories)",
        config.top_n, covered, total
    );

    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Failed to serialize report: {}", err);
            return ExitCode::FAILURE;
        }
    };
    match report_path {
        Some(out) => {
            if let Err(err) = fs::write(&out, json) {
                eprintln!("Failed to write {}: {}", out, err);
                return ExitCode::FAILURE;
            }
            println!("Report written to {}", out);
        }
        None => println!("{}", json),
    }
    ExitCode::SUCCESS
}
