//! Example of computing many days' timelines in parallel.
//!
//! Run with: cargo run --example parallel_timeline --features parallel

use life_tracker::{
    compute_timeline_parallel, compute_timeline_with_config, DaySummary, Place, PositionSample,
    TimelineConfig,
};
use rayon::prelude::*;
use std::time::Instant;

const MIN: i64 = 60_000;
const DAY: i64 = 24 * 60 * MIN;

/// One synthetic day: dwell, commute, dwell, with slight per-day variation.
fn synthetic_day(day: i64) -> Vec<PositionSample> {
    let base = 1_710_460_800_000 + day * DAY;
    let shift = (day % 7) as f64 * 0.00002;
    let mut samples = Vec::new();

    for m in 0..=120 {
        samples.push(PositionSample::new(51.5074 + shift, -0.1278, 10.0, base + m * MIN));
    }
    for k in 1..=30 {
        let lat = 51.5074 + shift + 0.0006 * k as f64;
        samples.push(PositionSample::new(lat, -0.1278, 12.0, base + (120 + k) * MIN));
    }
    for m in 151..=600 {
        samples.push(PositionSample::new(51.5254 + shift, -0.1278, 10.0, base + m * MIN));
    }
    samples
}

fn main() {
    println!("Parallel Timeline Example\n");

    let days: Vec<Vec<PositionSample>> = (0..60).map(synthetic_day).collect();
    let known = vec![Place::new("home", "Home", 51.5074, -0.1278).with_category("home")];
    let config = TimelineConfig::default();

    let start = Instant::now();
    let sequential: Vec<_> = days
        .iter()
        .map(|d| compute_timeline_with_config(d, &known, &config))
        .collect();
    println!("Sequential: {:?}", start.elapsed());

    let start = Instant::now();
    let parallel: Vec<_> = days
        .par_iter()
        .map(|d| compute_timeline_parallel(d, &known, &config))
        .collect();
    println!("Parallel:   {:?}", start.elapsed());

    println!("Results identical: {}", sequential == parallel);

    let (distance, visits) = parallel
        .iter()
        .map(|groups| DaySummary::from_groups(groups))
        .fold((0.0, 0), |(d, v), s| (d + s.total_distance_km(), v + s.places_visited));
    println!("\n{} days: {:.1} km moving, {} place visits", days.len(), distance, visits);
}
