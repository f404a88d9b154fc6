//! Example of rebuilding a day's timeline from stored samples.
//!
//! Run with: cargo run --example daily_timeline

use life_tracker::{
    compute_timeline, format_duration_ms, tally_visits, DaySummary, Place, PositionSample,
    TimelineEvent,
};

const MIN: i64 = 60_000;
// 2024-03-15T07:00:00Z
const DAY_START: i64 = 1_710_486_000_000;

/// Samples every minute at a fixed spot.
fn dwell(lat: f64, lng: f64, from_min: i64, to_min: i64) -> Vec<PositionSample> {
    (from_min..=to_min)
        .map(|m| PositionSample::new(lat, lng, 10.0, DAY_START + m * MIN))
        .collect()
}

/// Samples every minute on a straight line between two spots.
fn travel(from: (f64, f64), to: (f64, f64), from_min: i64, to_min: i64) -> Vec<PositionSample> {
    let steps = (to_min - from_min) as f64;
    (from_min + 1..to_min)
        .map(|m| {
            let f = (m - from_min) as f64 / steps;
            PositionSample::new(
                from.0 + (to.0 - from.0) * f,
                from.1 + (to.1 - from.1) * f,
                12.0,
                DAY_START + m * MIN,
            )
        })
        .collect()
}

fn main() {
    println!("Daily Timeline Example\n");

    let home = (51.5074, -0.1278);
    let cafe = (51.5124, -0.1278);
    let office = (51.5304, -0.1230);

    let mut samples = Vec::new();
    samples.extend(dwell(home.0, home.1, 0, 45));
    samples.extend(travel(home, cafe, 45, 55));
    samples.extend(dwell(cafe.0, cafe.1, 55, 80));
    samples.extend(travel(cafe, office, 80, 92));
    samples.extend(dwell(office.0, office.1, 92, 300));
    // Evening, after a long gap with no fixes
    samples.extend(dwell(home.0, home.1, 600, 660));

    let known = vec![
        Place::new("home", "Home", home.0, home.1).with_category("home"),
        Place::new("office", "Office", office.0, office.1).with_category("work"),
    ];

    let groups = compute_timeline(&samples, &known);

    for (i, group) in groups.iter().enumerate() {
        println!(
            "Group {} ({} - {}):",
            i + 1,
            (group.start_time - DAY_START) / MIN,
            (group.end_time - DAY_START) / MIN
        );
        for event in &group.events {
            match event {
                TimelineEvent::Movement(m) => println!(
                    "  {} {:.2} km in {} ({:.1} km/h)",
                    m.transport_mode.label(),
                    m.distance / 1000.0,
                    format_duration_ms(m.duration_ms),
                    m.average_speed_kmh
                ),
                TimelineEvent::PlaceVisit(v) => println!(
                    "  at {} [{}] for {} ({} fixes)",
                    v.place.name,
                    v.place.category,
                    format_duration_ms(v.duration_ms),
                    v.location_count
                ),
            }
        }
    }

    let summary = DaySummary::from_groups(&groups);
    println!(
        "\nSummary: {:.1} km, {} moving, {} places",
        summary.total_distance_km(),
        format_duration_ms(summary.total_movement_ms),
        summary.places_visited
    );

    let visits: Vec<_> = groups
        .iter()
        .flat_map(|g| &g.events)
        .filter_map(TimelineEvent::as_place_visit)
        .cloned()
        .collect();
    for place in tally_visits(&known, &visits) {
        println!("  {}: {} visits", place.name, place.visit_count);
    }
}
